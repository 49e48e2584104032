use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{require, Record};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Testimonial {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Name", &self.name)?;
        require("Role", &self.role)?;
        require("Company", &self.company)?;
        require("Testimonial", &self.text)?;
        require("Image", &self.image)
    }
}
