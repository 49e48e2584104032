use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{ApiClient, Envelope, Method};
use crate::error::ApiError;
use crate::session::{AdminProfile, SessionState};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;

/// Loose check used by the login form.
fn login_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("valid regex"))
}

/// Stricter whole-string check used by the profile form.
fn profile_email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
}

// ── Payloads ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() {
            return Err(ApiError::Validation("Email is required".into()));
        }
        if !login_email_re().is_match(&self.email) {
            return Err(ApiError::Validation("Please enter a valid email".into()));
        }
        if self.password.is_empty() {
            return Err(ApiError::Validation("Password is required".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ApiError::Validation("Username and email are required".into()));
        }
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err(ApiError::Validation(
                "Username must be at least 3 characters".into(),
            ));
        }
        if !profile_email_re().is_match(&self.email) {
            return Err(ApiError::Validation("Please enter a valid email address".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    /// Checked locally, never sent.
    #[serde(skip)]
    pub confirm_password: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ApiError::Validation("All password fields are required".into()));
        }
        if self.new_password != self.confirm_password {
            return Err(ApiError::Validation("New passwords do not match".into()));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(
                "New password must be at least 6 characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    admin: Option<AdminProfile>,
}

// ── Session manager ───────────────────────────────────

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl<'a> AuthApi<'a> {
    /// Sign in and persist token + profile. On any failure the session store
    /// is left exactly as it was.
    pub fn login(&self, credentials: &Credentials) -> Result<AdminProfile, ApiError> {
        credentials.validate()?;
        let _guard = self.client.guard("auth", "login")?;

        let env = self
            .client
            .submit(Method::Post, "/auth/login", Some(credentials))?;
        let data: LoginData = env.data_as()?;
        let token = data
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response has no token".into()))?;
        let admin = data.admin.unwrap_or_default();

        self.client.session().establish(&token, &admin)?;
        Ok(admin)
    }

    /// Local only; no request is made.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.session().invalidate()
    }

    /// Re-validate the stored token. No side effects; see `restore` for the
    /// caller-side invalidation.
    pub fn verify(&self) -> Result<Envelope, ApiError> {
        self.client
            .call(Method::Get, "/auth/verify", None)?
            .into_success()
    }

    /// Start-up check: a stored token that fails verification, for any
    /// reason, is cleared.
    pub fn restore(&self) -> SessionState {
        let session = self.client.session();
        if !session.is_authenticated() {
            return SessionState::Anonymous;
        }
        match self.verify() {
            Ok(_) => SessionState::Authenticated,
            Err(e) => {
                log::warn!("[auth] token verification failed: {}", e);
                if let Err(e) = session.invalidate() {
                    log::error!("[auth] could not clear session: {}", e);
                }
                SessionState::Anonymous
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.client.session().token()
    }

    pub fn admin(&self) -> Option<AdminProfile> {
        self.client.session().admin()
    }

    pub fn me(&self) -> Result<AdminProfile, ApiError> {
        let env = self
            .client
            .call(Method::Get, "/auth/me", None)?
            .into_success()?;
        let admin: Option<AdminProfile> = env.member("admin")?;
        admin.ok_or_else(|| ApiError::Decode("profile response has no admin".into()))
    }

    /// Update username/email and refresh the cached profile so later reads
    /// agree with the server.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<AdminProfile, ApiError> {
        update.validate()?;
        let _guard = self.client.guard("auth", "profile")?;

        let env = self
            .client
            .submit(Method::Put, "/auth/profile", Some(update))?;
        let returned: Option<AdminProfile> = env.member("admin")?;
        let admin = match returned {
            Some(admin) => admin,
            None => {
                let mut cached = self.admin().unwrap_or_default();
                cached.username = update.username.clone();
                cached.email = update.email.clone();
                cached
            }
        };
        self.client.session().refresh_admin(&admin)?;
        Ok(admin)
    }

    pub fn update_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        change.validate()?;
        let _guard = self.client.guard("auth", "password")?;
        self.client
            .submit(Method::Put, "/auth/password", Some(change))?;
        log::info!("[auth] password changed");
        Ok(())
    }
}
