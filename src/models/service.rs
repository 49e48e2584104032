use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{require, Record};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    pub fn new(title: &str, description: &str) -> Self {
        Service {
            id: None,
            icon: String::new(),
            title: title.to_string(),
            description: description.to_string(),
            link: Some("#".to_string()),
            extra: Map::new(),
        }
    }
}

impl Record for Service {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Title", &self.title)?;
        require("Description", &self.description)
    }
}
