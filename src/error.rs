use std::fmt;

/// Every failure the admin client can surface. The variants follow where the
/// failure happened: before the network (`Validation`, `Busy`, `Config`,
/// `Session`), on the wire (`Transport`), or in the server's answer (`Http`,
/// `Rejected`, `Decode`).
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response.
    Transport(String),
    /// Non-2xx status. `message` is the server's, or a generic fallback.
    Http { status: u16, message: String },
    /// 2xx envelope with `success != true`.
    Rejected(String),
    /// Client-side form check, raised before any request is issued.
    Validation(String),
    /// Malformed JSON, or `data` not matching the expected record shape.
    Decode(String),
    /// Another call for the same (resource, operation) is still running.
    Busy {
        resource: String,
        operation: String,
    },
    Session(String),
    Config(String),
}

impl ApiError {
    /// 401/403 from the server: the stored token is no good.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "network error: {}", msg),
            ApiError::Http { status, message } => write!(f, "{} (HTTP {})", message, status),
            ApiError::Rejected(msg) => write!(f, "{}", msg),
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ApiError::Busy {
                resource,
                operation,
            } => write!(f, "{} {} already in progress", resource, operation),
            ApiError::Session(msg) => write!(f, "session: {}", msg),
            ApiError::Config(msg) => write!(f, "config: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_only_for_401_and_403() {
        let unauthorized = ApiError::Http {
            status: 401,
            message: "Invalid token".into(),
        };
        let forbidden = ApiError::Http {
            status: 403,
            message: "Forbidden".into(),
        };
        let missing = ApiError::Http {
            status: 404,
            message: "Not found".into(),
        };
        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!missing.is_auth_failure());
        assert!(!ApiError::Transport("refused".into()).is_auth_failure());
    }

    #[test]
    fn http_message_is_the_server_text() {
        let e = ApiError::Http {
            status: 400,
            message: "Title is required".into(),
        };
        assert_eq!(e.message(), "Title is required");
        assert_eq!(e.to_string(), "Title is required (HTTP 400)");
    }

    #[test]
    fn busy_names_the_key() {
        let e = ApiError::Busy {
            resource: "projects".into(),
            operation: "add".into(),
        };
        assert_eq!(e.to_string(), "projects add already in progress");
    }
}
