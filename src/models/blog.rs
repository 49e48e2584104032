use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{require, Record};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image: String,
    /// Display date as entered in the editor ("2024-03-15", "Mar 15, 2024").
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /blogs` payload: the post list plus the separately tracked featured post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogsPage {
    #[serde(default)]
    pub blogs: Vec<Blog>,
    #[serde(default)]
    pub featured_blog: Option<Blog>,
}

impl Blog {
    pub fn new(title: &str, date: &str) -> Self {
        Blog {
            id: None,
            title: title.to_string(),
            excerpt: String::new(),
            image: String::new(),
            date: date.to_string(),
            read_time: String::new(),
            category: String::new(),
            link: String::new(),
            extra: Map::new(),
        }
    }
}

impl Record for Blog {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Title", &self.title)
    }
}
