pub mod blog;
pub mod contact;
pub mod content;
pub mod experience;
pub mod project;
pub mod service;
pub mod skill;
pub mod testimonial;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

/// A server-owned document inside a collection resource.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Server-assigned `_id`; `None` for items not yet created.
    fn id(&self) -> Option<&str>;

    /// Tidy form input before it is sent (trim list entries, drop blanks).
    fn normalize(&mut self) {}

    /// Required-field checks, run before any request is issued.
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!(
            "Please fill out the {} field",
            field
        )));
    }
    Ok(())
}

/// Trim every entry and drop the blank ones.
pub(crate) fn clean_list(list: &mut Vec<String>) {
    for entry in list.iter_mut() {
        let trimmed = entry.trim();
        if trimmed.len() != entry.len() {
            *entry = trimmed.to_string();
        }
    }
    list.retain(|e| !e.is_empty());
}

/// Comma-separated form input ("rust, tokio, ,serde") into a clean list.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_whitespace() {
        assert!(require("Title", "  ").is_err());
        assert!(require("Title", "ok").is_ok());
        match require("Description", "") {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "Please fill out the Description field"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn clean_list_trims_and_drops_blanks() {
        let mut list = vec![" a ".to_string(), "".to_string(), "   ".to_string(), "b".to_string()];
        clean_list(&mut list);
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn split_csv_matches_form_behaviour() {
        assert_eq!(split_csv("rust, tokio, ,serde,"), vec!["rust", "tokio", "serde"]);
        assert!(split_csv(" , ").is_empty());
    }
}
