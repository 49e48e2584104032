use serde_json::{Map, Value};
use std::marker::PhantomData;

use super::{path_segment, ApiClient, Method};
use crate::error::ApiError;
use crate::models::blog::Blog;
use crate::models::experience::ExperienceItem;
use crate::models::project::Project;
use crate::models::service::Service;
use crate::models::skill::ProficiencySkill;
use crate::models::testimonial::Testimonial;
use crate::models::Record;

/// A collection endpoint group: `GET/PUT/POST path`, `DELETE path/:id`.
/// `KEY` names the array inside `data` and inside a full-replace body.
pub trait CollectionResource {
    const NAME: &'static str;
    const PATH: &'static str;
    const KEY: &'static str;
    type Item: Record;
}

pub struct Projects;
pub struct Blogs;
pub struct Services;
pub struct Testimonials;
pub struct Experience;
pub struct Skills;

impl CollectionResource for Projects {
    const NAME: &'static str = "projects";
    const PATH: &'static str = "/projects";
    const KEY: &'static str = "projects";
    type Item = Project;
}

impl CollectionResource for Blogs {
    const NAME: &'static str = "blogs";
    const PATH: &'static str = "/blogs";
    const KEY: &'static str = "blogs";
    type Item = Blog;
}

impl CollectionResource for Services {
    const NAME: &'static str = "services";
    const PATH: &'static str = "/services";
    const KEY: &'static str = "services";
    type Item = Service;
}

impl CollectionResource for Testimonials {
    const NAME: &'static str = "testimonials";
    const PATH: &'static str = "/testimonials";
    const KEY: &'static str = "testimonials";
    type Item = Testimonial;
}

impl CollectionResource for Experience {
    const NAME: &'static str = "experience";
    const PATH: &'static str = "/experience";
    const KEY: &'static str = "experiences";
    type Item = ExperienceItem;
}

/// The proficiency list; skill categories live in `api::skills`.
impl CollectionResource for Skills {
    const NAME: &'static str = "skills";
    const PATH: &'static str = "/skills";
    const KEY: &'static str = "proficiencySkills";
    type Item = ProficiencySkill;
}

pub struct Collection<'a, R> {
    pub(super) client: &'a ApiClient,
    _resource: PhantomData<R>,
}

impl ApiClient {
    pub fn collection<R: CollectionResource>(&self) -> Collection<'_, R> {
        Collection {
            client: self,
            _resource: PhantomData,
        }
    }

    pub fn projects(&self) -> Collection<'_, Projects> {
        self.collection()
    }

    pub fn blogs(&self) -> Collection<'_, Blogs> {
        self.collection()
    }

    pub fn services(&self) -> Collection<'_, Services> {
        self.collection()
    }

    pub fn testimonials(&self) -> Collection<'_, Testimonials> {
        self.collection()
    }

    pub fn experience(&self) -> Collection<'_, Experience> {
        self.collection()
    }

    pub fn skills(&self) -> Collection<'_, Skills> {
        self.collection()
    }
}

/// `{KEY: items}` body for a full-collection replace.
pub(super) fn keyed_body<T: serde::Serialize>(key: &str, value: &T) -> Result<Value, ApiError> {
    let mut body = Map::new();
    body.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(body))
}

pub(super) fn prepare<T: Record>(item: &T) -> Result<T, ApiError> {
    let mut item = item.clone();
    item.normalize();
    item.validate()?;
    Ok(item)
}

impl<'a, R: CollectionResource> Collection<'a, R> {
    /// The full current collection.
    pub fn list(&self) -> Result<Vec<R::Item>, ApiError> {
        self.client
            .call(Method::Get, R::PATH, None)?
            .into_success()?
            .member(R::KEY)
    }

    /// Submit the entire collection; the server stores it as given.
    pub fn replace_collection(&self, items: &[R::Item]) -> Result<Vec<R::Item>, ApiError> {
        let items = items.iter().map(prepare).collect::<Result<Vec<_>, _>>()?;
        let _guard = self.client.guard(R::NAME, "replace")?;
        let body = keyed_body(R::KEY, &items)?;
        self.client
            .call(Method::Put, R::PATH, Some(body))?
            .into_success()?
            .member(R::KEY)
    }

    /// Append one item. Returns the refreshed collection.
    pub fn add(&self, item: &R::Item) -> Result<Vec<R::Item>, ApiError> {
        let item = prepare(item)?;
        let _guard = self.client.guard(R::NAME, "add")?;
        self.client
            .submit(Method::Post, R::PATH, Some(&item))?
            .member(R::KEY)
    }

    /// Swap `item` into the caller's copy by `_id` and replace the whole
    /// collection with the result.
    pub fn update_item(&self, current: &[R::Item], item: &R::Item) -> Result<Vec<R::Item>, ApiError> {
        let id = item
            .id()
            .ok_or_else(|| ApiError::Validation(format!("{} item has no _id", R::NAME)))?;
        let mut items = current.to_vec();
        let slot = items
            .iter_mut()
            .find(|i| i.id() == Some(id))
            .ok_or_else(|| ApiError::Validation(format!("no {} item with id {}", R::NAME, id)))?;
        *slot = item.clone();
        self.replace_collection(&items)
    }

    /// Drop the item with `id` from the caller's copy and replace the whole
    /// collection; for screens that never call the item delete endpoint.
    pub fn remove_via_replace(&self, current: &[R::Item], id: &str) -> Result<Vec<R::Item>, ApiError> {
        let items: Vec<R::Item> = current
            .iter()
            .filter(|i| i.id() != Some(id))
            .cloned()
            .collect();
        self.replace_collection(&items)
    }

    /// `DELETE path/:id`. The server returns no collection; filter locally.
    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} id is required", R::NAME)));
        }
        let _guard = self.client.guard(R::NAME, "delete")?;
        let endpoint = format!("{}/{}", R::PATH, path_segment(id));
        self.client
            .call(Method::Delete, &endpoint, None)?
            .into_success()?;
        log::info!("[api] deleted {} {}", R::NAME, id);
        Ok(())
    }
}
