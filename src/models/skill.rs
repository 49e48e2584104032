use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{clean_list, require, Record};
use crate::error::ApiError;

/// A named skill with a 0-100 proficiency bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProficiencySkill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A titled group of skill names ("Backend": rust, go, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /skills` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsPage {
    #[serde(default)]
    pub proficiency_skills: Vec<ProficiencySkill>,
    #[serde(default)]
    pub skill_categories: Vec<SkillCategory>,
}

impl ProficiencySkill {
    pub fn new(name: &str, level: u32) -> Self {
        ProficiencySkill {
            id: None,
            name: name.to_string(),
            level,
            extra: Map::new(),
        }
    }
}

impl Record for ProficiencySkill {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Name", &self.name)?;
        if self.level > 100 {
            return Err(ApiError::Validation(
                "Skill level must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

impl Record for SkillCategory {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn normalize(&mut self) {
        clean_list(&mut self.skills);
    }

    fn validate(&self) -> Result<(), ApiError> {
        require("Title", &self.title)?;
        if self.skills.iter().all(|s| s.trim().is_empty()) {
            return Err(ApiError::Validation("Please add at least one skill".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_above_hundred_is_rejected() {
        assert!(ProficiencySkill::new("Rust", 101).validate().is_err());
        assert!(ProficiencySkill::new("Rust", 100).validate().is_ok());
    }

    #[test]
    fn category_needs_a_real_skill() {
        let mut cat = SkillCategory {
            id: None,
            icon: "⚙".into(),
            title: "Backend".into(),
            skills: vec!["  ".into()],
            extra: Map::new(),
        };
        assert!(cat.validate().is_err());
        cat.skills.push(" Rust ".into());
        cat.normalize();
        assert_eq!(cat.skills, vec!["Rust"]);
        assert!(cat.validate().is_ok());
    }
}
