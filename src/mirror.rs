//! Local copies of server collections, kept in step with each successful
//! mutation so a screen never needs to refetch after its own writes.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::contact::{ContactMessage, MessageStatus};
use crate::models::project::Project;
use crate::models::Record;

#[derive(Debug, Clone)]
pub struct Mirror<T: Record> {
    items: Vec<T>,
}

impl<T: Record> Default for Mirror<T> {
    fn default() -> Self {
        Mirror { items: Vec::new() }
    }
}

impl<T: Record> Mirror<T> {
    pub fn new(items: Vec<T>) -> Self {
        Mirror { items }
    }

    /// Adopt the collection a list/add/replace call returned.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Drop the item whose `_id` is exactly `id`. Returns whether one was found.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != Some(id));
        self.items.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

impl Mirror<Project> {
    pub fn featured_count(&self) -> usize {
        self.items.iter().filter(|p| p.featured).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct InboxCounts {
    pub total: usize,
    pub new: usize,
    pub read: usize,
    pub replied: usize,
}

/// Contact messages plus the status transitions the admin performs on them.
pub struct Inbox {
    client: ApiClient,
    messages: Vec<ContactMessage>,
}

impl Inbox {
    pub fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let messages = client.contact().messages()?;
        Ok(Inbox {
            client: client.clone(),
            messages,
        })
    }

    fn position(&self, id: &str) -> Result<usize, ApiError> {
        self.messages
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ApiError::Validation(format!("no message with id {}", id)))
    }

    /// View a message. A `new` message is marked read on the server first;
    /// read or replied messages are left as they are.
    pub fn open(&mut self, id: &str) -> Result<&ContactMessage, ApiError> {
        let idx = self.position(id)?;
        if self.messages[idx].status == MessageStatus::New {
            self.client.contact().mark_read(id)?;
            let msg = &mut self.messages[idx];
            msg.status = MessageStatus::Read;
            msg.read = true;
        }
        Ok(&self.messages[idx])
    }

    /// Mark replied and return the `mailto:` link for the answer.
    pub fn reply(&mut self, id: &str) -> Result<String, ApiError> {
        let idx = self.position(id)?;
        if self.messages[idx].status != MessageStatus::Replied {
            self.set_status(id, MessageStatus::Replied)?;
        }
        Ok(self.messages[idx].reply_link())
    }

    pub fn set_status(&mut self, id: &str, status: MessageStatus) -> Result<(), ApiError> {
        let idx = self.position(id)?;
        self.client.contact().update_status(id, status)?;
        let msg = &mut self.messages[idx];
        msg.status = status;
        if status != MessageStatus::New {
            msg.read = true;
        }
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.client.contact().delete_message(id)?;
        self.messages.retain(|m| m.id != id);
        Ok(())
    }

    pub fn filter(&self, status: Option<MessageStatus>) -> Vec<&ContactMessage> {
        self.messages
            .iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .collect()
    }

    pub fn counts(&self) -> InboxCounts {
        let mut counts = InboxCounts {
            total: self.messages.len(),
            ..InboxCounts::default()
        };
        for m in &self.messages {
            match m.status {
                MessageStatus::New => counts.new += 1,
                MessageStatus::Read => counts.read += 1,
                MessageStatus::Replied => counts.replied += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, featured: bool) -> Project {
        let mut p = Project::new(id);
        p.id = Some(id.to_string());
        p.featured = featured;
        p
    }

    #[test]
    fn remove_is_exact_match() {
        let mut m = Mirror::new(vec![project("p1", false), project("p10", true)]);
        assert!(!m.remove("p"));
        assert!(m.remove("p1"));
        assert!(!m.contains("p1"));
        assert!(m.contains("p10"));
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn featured_projects_are_counted() {
        let m = Mirror::new(vec![
            project("a", true),
            project("b", false),
            project("c", true),
        ]);
        assert_eq!(m.featured_count(), 2);
    }

    #[test]
    fn replace_adopts_server_copy() {
        let mut m: Mirror<Project> = Mirror::default();
        m.replace(vec![project("x", false)]);
        assert_eq!(m.items()[0].id.as_deref(), Some("x"));
    }
}
