use super::{path_segment, ApiClient, Envelope, Method};
use crate::error::ApiError;
use crate::models::contact::{ContactForm, ContactInfo, ContactMessage, MessageStatus};

pub struct ContactApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn contact(&self) -> ContactApi<'_> {
        ContactApi { client: self }
    }
}

fn message_key(id: &str) -> String {
    format!("message:{}", id)
}

fn require_id(id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation("message id is required".into()));
    }
    Ok(())
}

impl<'a> ContactApi<'a> {
    /// The contact section document shown on the public site.
    pub fn info(&self) -> Result<ContactInfo, ApiError> {
        self.client.fetch("/contact")
    }

    pub fn update_info(&self, info: &ContactInfo) -> Result<ContactInfo, ApiError> {
        let _guard = self.client.guard("contact", "update")?;
        let env = self.client.submit(Method::Put, "/contact", Some(info))?;
        match env.data {
            Some(_) => env.data_as(),
            None => self.info(),
        }
    }

    /// Public form submission, as the portfolio site sends it.
    pub fn submit(&self, form: &ContactForm) -> Result<Envelope, ApiError> {
        form.validate()?;
        let _guard = self.client.guard("contact", "submit")?;
        self.client.submit(Method::Post, "/contact/submit", Some(form))
    }

    pub fn messages(&self) -> Result<Vec<ContactMessage>, ApiError> {
        self.client
            .call(Method::Get, "/contact/messages", None)?
            .into_success()?
            .member("messages")
    }

    pub fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        require_id(id)?;
        let _guard = self.client.guard(&message_key(id), "read")?;
        let endpoint = format!("/contact/messages/{}/read", path_segment(id));
        self.client.call(Method::Put, &endpoint, None)?.into_success()?;
        Ok(())
    }

    pub fn update_status(&self, id: &str, status: MessageStatus) -> Result<(), ApiError> {
        require_id(id)?;
        let _guard = self.client.guard(&message_key(id), "status")?;
        let endpoint = format!("/contact/messages/{}/status", path_segment(id));
        let body = serde_json::json!({ "status": status });
        self.client
            .call(Method::Put, &endpoint, Some(body))?
            .into_success()?;
        log::info!("[api] message {} marked {}", id, status);
        Ok(())
    }

    pub fn delete_message(&self, id: &str) -> Result<(), ApiError> {
        require_id(id)?;
        let _guard = self.client.guard(&message_key(id), "delete")?;
        let endpoint = format!("/contact/messages/{}", path_segment(id));
        self.client
            .call(Method::Delete, &endpoint, None)?
            .into_success()?;
        Ok(())
    }
}
