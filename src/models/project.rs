use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{clean_list, require, Record};
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub demo_link: String,
    #[serde(default)]
    pub code_link: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(title: &str) -> Self {
        Project {
            id: None,
            title: title.to_string(),
            description: String::new(),
            demo_link: String::new(),
            code_link: String::new(),
            image: String::new(),
            tech: Vec::new(),
            featured: false,
            date: None,
            extra: Map::new(),
        }
    }
}

impl Record for Project {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn normalize(&mut self) {
        clean_list(&mut self.tech);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Title", &self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_shape() {
        let raw = r#"{
            "_id": "p1", "title": "Folio", "description": "site",
            "demoLink": "https://demo", "codeLink": "https://code",
            "image": "/img.png", "tech": ["rust"], "featured": true,
            "date": "2023-04-01", "order": 3
        }"#;
        let p: Project = serde_json::from_str(raw).unwrap();
        assert_eq!(p.id(), Some("p1"));
        assert_eq!(p.demo_link, "https://demo");
        assert!(p.featured);
        assert_eq!(p.extra.get("order"), Some(&Value::from(3)));

        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["codeLink"], "https://code");
        assert_eq!(back["order"], 3);
    }

    #[test]
    fn new_project_omits_id() {
        let v = serde_json::to_value(Project::new("X")).unwrap();
        assert!(v.get("_id").is_none());
        assert!(v.get("date").is_none());
    }

    #[test]
    fn missing_title_fails_decode() {
        assert!(serde_json::from_str::<Project>(r#"{"_id":"p"}"#).is_err());
    }

    #[test]
    fn normalize_cleans_tech() {
        let mut p = Project::new("X");
        p.tech = vec![" rust ".into(), "".into()];
        p.normalize();
        assert_eq!(p.tech, vec!["rust"]);
        assert!(Project::new(" ").validate().is_err());
    }
}
