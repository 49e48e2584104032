use super::collection::{keyed_body, prepare, Collection, CollectionResource, Skills};
use super::Method;
use crate::error::ApiError;
use crate::models::skill::{SkillCategory, SkillsPage};
use crate::models::Record;

const CATEGORIES_KEY: &str = "skillCategories";

/// Skill categories have no item endpoints; every change goes through a
/// replace of the full category list.
impl<'a> Collection<'a, Skills> {
    pub fn page(&self) -> Result<SkillsPage, ApiError> {
        let env = self
            .client
            .call(Method::Get, Skills::PATH, None)?
            .into_success()?;
        Ok(SkillsPage {
            proficiency_skills: env.member(Skills::KEY)?,
            skill_categories: env.member(CATEGORIES_KEY)?,
        })
    }

    pub fn categories(&self) -> Result<Vec<SkillCategory>, ApiError> {
        Ok(self.page()?.skill_categories)
    }

    pub fn replace_categories(&self, categories: &[SkillCategory]) -> Result<Vec<SkillCategory>, ApiError> {
        let categories = categories
            .iter()
            .map(prepare)
            .collect::<Result<Vec<_>, _>>()?;
        let _guard = self.client.guard(Skills::NAME, "categories")?;
        let body = keyed_body(CATEGORIES_KEY, &categories)?;
        self.client
            .call(Method::Put, Skills::PATH, Some(body))?
            .into_success()?
            .member(CATEGORIES_KEY)
    }

    pub fn add_category(
        &self,
        current: &[SkillCategory],
        category: &SkillCategory,
    ) -> Result<Vec<SkillCategory>, ApiError> {
        let mut list = current.to_vec();
        list.push(category.clone());
        self.replace_categories(&list)
    }

    pub fn update_category(
        &self,
        current: &[SkillCategory],
        category: &SkillCategory,
    ) -> Result<Vec<SkillCategory>, ApiError> {
        let id = category
            .id()
            .ok_or_else(|| ApiError::Validation("category has no _id".into()))?;
        if !current.iter().any(|c| c.id() == Some(id)) {
            return Err(ApiError::Validation(format!("no skill category with id {}", id)));
        }
        let list: Vec<SkillCategory> = current
            .iter()
            .map(|c| if c.id() == Some(id) { category.clone() } else { c.clone() })
            .collect();
        self.replace_categories(&list)
    }

    pub fn delete_category(&self, current: &[SkillCategory], id: &str) -> Result<Vec<SkillCategory>, ApiError> {
        let list: Vec<SkillCategory> = current
            .iter()
            .filter(|c| c.id() != Some(id))
            .cloned()
            .collect();
        self.replace_categories(&list)
    }
}
