use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_CONFIG_FILE: &str = "folio-admin.toml";

pub const ENV_API_URL: &str = "FOLIO_API_URL";
pub const ENV_SESSION_FILE: &str = "FOLIO_SESSION_FILE";
pub const ENV_TIMEOUT_SECS: &str = "FOLIO_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    /// Base URL every endpoint path is appended to, without trailing slash.
    pub api_url: String,
    pub session_file: PathBuf,
    /// No client-side timeout when unset.
    pub timeout_secs: Option<u64>,
}

/// Shape of `folio-admin.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            timeout_secs: None,
        }
    }
}

impl AdminConfig {
    /// Defaults, then the TOML file, then the environment, then the
    /// `--api-url` flag. A config path given explicitly must exist; the
    /// default `folio-admin.toml` is only read when present.
    pub fn load(config_path: Option<&Path>, api_url_flag: Option<&str>) -> Result<Self, ApiError> {
        Self::load_with(config_path, api_url_flag, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(
        config_path: Option<&Path>,
        api_url_flag: Option<&str>,
        env: F,
    ) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AdminConfig::default();

        let file = match config_path {
            Some(path) => Some(read_file(path)?),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Some(read_file(path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            if let Some(url) = file.api_url {
                cfg.api_url = url;
            }
            if let Some(path) = file.session_file {
                cfg.session_file = path;
            }
            if file.timeout_secs.is_some() {
                cfg.timeout_secs = file.timeout_secs;
            }
        }

        if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            cfg.api_url = url;
        }
        if let Some(path) = env(ENV_SESSION_FILE).filter(|v| !v.trim().is_empty()) {
            cfg.session_file = PathBuf::from(path);
        }
        if let Some(raw) = env(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ApiError::Config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
            cfg.timeout_secs = Some(secs);
        }

        if let Some(url) = api_url_flag {
            cfg.api_url = url.to_string();
        }

        cfg.api_url = normalize_api_url(&cfg.api_url)?;
        if cfg.timeout_secs == Some(0) {
            cfg.timeout_secs = None;
        }
        Ok(cfg)
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ApiError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ApiError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&raw).map_err(|e| ApiError::Config(format!("{}: {}", path.display(), e)))
}

/// Require an absolute http(s) URL and strip trailing slashes so endpoint
/// paths (which start with '/') can be appended directly.
pub fn normalize_api_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| ApiError::Config(format!("invalid API URL '{}': {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::Config(format!(
                "API URL must use http or https, got '{}'",
                other
            )))
        }
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn default_session_file() -> PathBuf {
    match dirs_next::config_dir() {
        Some(dir) => dir.join("folio-admin").join("session.json"),
        None => PathBuf::from(".folio-admin-session.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("folio-admin-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let missing = std::env::temp_dir().join(format!("{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            AdminConfig::load_with(Some(missing.as_path()), None, env_of(&[])),
            Err(ApiError::Config(_))
        ));
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let path = write_temp("");
        let cfg = AdminConfig::load_with(Some(path.as_path()), None, env_of(&[])).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.timeout_secs, None);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn file_then_env_then_flag() {
        let path = write_temp(
            "api_url = \"https://cms.example.com/api/\"\nsession_file = \"/tmp/s.json\"\ntimeout_secs = 30\n",
        );
        let cfg = AdminConfig::load_with(Some(path.as_path()), None, env_of(&[])).unwrap();
        assert_eq!(cfg.api_url, "https://cms.example.com/api");
        assert_eq!(cfg.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(cfg.timeout_secs, Some(30));

        let cfg = AdminConfig::load_with(
            Some(path.as_path()),
            None,
            env_of(&[(ENV_API_URL, "http://staging:5000/api"), (ENV_TIMEOUT_SECS, "0")]),
        )
        .unwrap();
        assert_eq!(cfg.api_url, "http://staging:5000/api");
        assert_eq!(cfg.timeout_secs, None);

        let cfg = AdminConfig::load_with(
            Some(path.as_path()),
            Some("http://flag:1/api"),
            env_of(&[(ENV_API_URL, "http://staging:5000/api")]),
        )
        .unwrap();
        assert_eq!(cfg.api_url, "http://flag:1/api");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let path = write_temp("api_ur = \"typo\"\n");
        assert!(matches!(
            AdminConfig::load_with(Some(path.as_path()), None, env_of(&[])),
            Err(ApiError::Config(_))
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_timeout_env_is_a_config_error() {
        let path = write_temp("");
        let res = AdminConfig::load_with(Some(path.as_path()), None, env_of(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert!(matches!(res, Err(ApiError::Config(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn api_url_must_be_http() {
        assert_eq!(normalize_api_url("http://localhost:5000/api//").unwrap(), "http://localhost:5000/api");
        assert!(normalize_api_url("ftp://host/api").is_err());
        assert!(normalize_api_url("localhost:5000").is_err());
        assert!(normalize_api_url("/api").is_err());
    }
}
