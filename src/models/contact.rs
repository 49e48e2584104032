use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::require;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Read,
    Replied,
}

impl Default for MessageStatus {
    fn default() -> Self {
        MessageStatus::New
    }
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Read => "read",
            MessageStatus::Replied => "replied",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(MessageStatus::New),
            "read" => Ok(MessageStatus::Read),
            "replied" => Ok(MessageStatus::Replied),
            other => Err(ApiError::Validation(format!(
                "unknown message status '{}' (expected new, read or replied)",
                other
            ))),
        }
    }
}

/// A contact-form submission as listed under `/contact/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    /// `mailto:` link the reply action opens.
    pub fn reply_link(&self) -> String {
        format!("mailto:{}?subject=Re: {}", self.email, self.subject)
    }
}

/// Public form payload for `POST /contact/submit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("Name", &self.name)?;
        require("Email", &self.email)?;
        require("Message", &self.message)
    }
}

/// The `/contact` section document (address, phone, socials, ...). The
/// dashboard edits it as an opaque object.
pub type ContactInfo = Map<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Read".parse::<MessageStatus>().unwrap(), MessageStatus::Read);
        assert_eq!(" replied ".parse::<MessageStatus>().unwrap(), MessageStatus::Replied);
        assert!("archived".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn message_decodes_mongo_timestamps() {
        let raw = r#"{
            "_id": "m1", "name": "Bo", "email": "bo@example.com",
            "subject": "Hi", "message": "Hello", "status": "new",
            "read": false, "createdAt": "2024-05-01T10:20:30.000Z"
        }"#;
        let m: ContactMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(m.status, MessageStatus::New);
        assert!(m.created_at.is_some());
        assert_eq!(m.reply_link(), "mailto:bo@example.com?subject=Re: Hi");
    }

    #[test]
    fn missing_status_defaults_to_new() {
        let m: ContactMessage = serde_json::from_str(r#"{"_id":"m2"}"#).unwrap();
        assert_eq!(m.status, MessageStatus::New);
        assert!(!m.read);
    }
}
