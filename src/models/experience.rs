use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{clean_list, Record};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub year: String,
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for ExperienceItem {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn normalize(&mut self) {
        clean_list(&mut self.responsibilities);
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.year.trim().is_empty() || self.role.trim().is_empty() || self.company.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please fill out all required fields (Year, Role, Company)".into(),
            ));
        }
        if self.responsibilities.iter().all(|r| r.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Please add at least one responsibility".into(),
            ));
        }
        Ok(())
    }
}
