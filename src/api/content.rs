use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::{join_all, settle_all, ApiClient, Method, Task};
use crate::error::ApiError;
use crate::models::content::{About, Footer, Hero};

/// A singleton page section. `PUT` merges a partial document server-side.
pub trait Section: Serialize + DeserializeOwned + Clone + Default + Send + 'static {
    const NAME: &'static str;
    const PATH: &'static str;
}

impl Section for Hero {
    const NAME: &'static str = "hero";
    const PATH: &'static str = "/hero";
}

impl Section for About {
    const NAME: &'static str = "about";
    const PATH: &'static str = "/about";
}

impl Section for Footer {
    const NAME: &'static str = "footer";
    const PATH: &'static str = "/footer";
}

pub struct SectionApi<'a, S> {
    client: &'a ApiClient,
    _section: PhantomData<S>,
}

impl ApiClient {
    pub fn section<S: Section>(&self) -> SectionApi<'_, S> {
        SectionApi {
            client: self,
            _section: PhantomData,
        }
    }

    pub fn hero(&self) -> SectionApi<'_, Hero> {
        self.section()
    }

    pub fn about(&self) -> SectionApi<'_, About> {
        self.section()
    }

    pub fn footer(&self) -> SectionApi<'_, Footer> {
        self.section()
    }

    pub fn content_editor(&self) -> ContentEditor {
        ContentEditor {
            client: self.clone(),
        }
    }
}

impl<'a, S: Section> SectionApi<'a, S> {
    pub fn get(&self) -> Result<S, ApiError> {
        self.client.fetch(S::PATH)
    }

    /// Send only the fields present in `partial` (a full section works too);
    /// the server merges them into its copy. Returns the merged section.
    pub fn merge_fields<P: Serialize + ?Sized>(&self, partial: &P) -> Result<S, ApiError> {
        let body = serde_json::to_value(partial)?;
        if !body.is_object() {
            return Err(ApiError::Validation(format!(
                "{} update must be a JSON object",
                S::NAME
            )));
        }
        let _guard = self.client.guard(S::NAME, "merge")?;
        let env = self
            .client
            .call(Method::Put, S::PATH, Some(body))?
            .into_success()?;
        match env.data {
            Some(_) => env.data_as(),
            None => self.get(),
        }
    }
}

// ── Content editor ────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSnapshot {
    pub hero: Hero,
    pub about: About,
    pub footer: Footer,
}

/// Sections to push in one save. `None` leaves that section alone.
#[derive(Debug, Clone, Default)]
pub struct ContentChanges {
    pub hero: Option<Hero>,
    pub about: Option<About>,
    pub footer: Option<Footer>,
}

impl From<ContentSnapshot> for ContentChanges {
    fn from(s: ContentSnapshot) -> Self {
        ContentChanges {
            hero: Some(s.hero),
            about: Some(s.about),
            footer: Some(s.footer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    /// Some sections were stored, others were not. Nothing is rolled back.
    Partial {
        saved: Vec<&'static str>,
        failed: Vec<(&'static str, ApiError)>,
    },
    Failed(Vec<(&'static str, ApiError)>),
}

impl SaveOutcome {
    pub fn summary(&self) -> &'static str {
        match self {
            SaveOutcome::Saved => "All changes saved successfully!",
            SaveOutcome::Partial { .. } => "Some changes failed to save. Please try again.",
            SaveOutcome::Failed(_) => "Failed to save changes. Please try again.",
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

enum Loaded {
    Hero(Hero),
    About(About),
    Footer(Footer),
}

/// Loads and saves hero, about and footer together.
pub struct ContentEditor {
    client: ApiClient,
}

impl ContentEditor {
    /// All three sections, fetched concurrently. Any failure fails the load.
    pub fn load(&self) -> Result<ContentSnapshot, ApiError> {
        let about = self.client.clone();
        let hero = self.client.clone();
        let footer = self.client.clone();
        let tasks: Vec<Task<Loaded>> = vec![
            Box::new(move || about.about().get().map(Loaded::About)),
            Box::new(move || hero.hero().get().map(Loaded::Hero)),
            Box::new(move || footer.footer().get().map(Loaded::Footer)),
        ];

        let mut snapshot = ContentSnapshot::default();
        for part in join_all(tasks)? {
            match part {
                Loaded::Hero(h) => snapshot.hero = h,
                Loaded::About(a) => snapshot.about = a,
                Loaded::Footer(f) => snapshot.footer = f,
            }
        }
        Ok(snapshot)
    }

    /// Push every given section concurrently and wait for all of them.
    pub fn save(&self, changes: ContentChanges) -> SaveOutcome {
        let mut names: Vec<&'static str> = Vec::new();
        let mut tasks: Vec<Task<()>> = Vec::new();

        if let Some(about) = changes.about {
            let client = self.client.clone();
            names.push(About::NAME);
            tasks.push(Box::new(move || client.about().merge_fields(&about).map(|_| ())));
        }
        if let Some(hero) = changes.hero {
            let client = self.client.clone();
            names.push(Hero::NAME);
            tasks.push(Box::new(move || client.hero().merge_fields(&hero).map(|_| ())));
        }
        if let Some(footer) = changes.footer {
            let client = self.client.clone();
            names.push(Footer::NAME);
            tasks.push(Box::new(move || client.footer().merge_fields(&footer).map(|_| ())));
        }

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in names.into_iter().zip(settle_all(tasks)) {
            match result {
                Ok(()) => saved.push(name),
                Err(e) => {
                    log::warn!("[api] saving {} failed: {}", name, e);
                    failed.push((name, e));
                }
            }
        }

        if failed.is_empty() {
            SaveOutcome::Saved
        } else if saved.is_empty() {
            SaveOutcome::Failed(failed)
        } else {
            SaveOutcome::Partial { saved, failed }
        }
    }

    pub fn save_all(&self, snapshot: ContentSnapshot) -> SaveOutcome {
        self.save(snapshot.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_messages_are_distinct() {
        let failed = vec![("about", ApiError::Rejected("x".into()))];
        let partial = SaveOutcome::Partial {
            saved: vec!["hero", "footer"],
            failed: failed.clone(),
        };
        let all_failed = SaveOutcome::Failed(failed);
        assert_ne!(SaveOutcome::Saved.summary(), partial.summary());
        assert_ne!(partial.summary(), all_failed.summary());
        assert!(SaveOutcome::Saved.is_saved());
        assert!(!partial.is_saved());
    }
}
