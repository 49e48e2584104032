use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use std::time::Duration;

use super::{Body, HttpRequest, HttpResponse, Method, Transport};
use crate::error::ApiError;

/// Blocking reqwest transport. One client (and connection pool) per process.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// `timeout: None` disables reqwest's default 30s request timeout, so a
    /// hung server hangs the call.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client error: {}", e)))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match req.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match req.body {
            Body::Empty => builder,
            Body::Json(value) => builder.body(serde_json::to_vec(&value)?),
            Body::Multipart { fields, file } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                    .map_err(|e| ApiError::Transport(format!("invalid MIME type: {}", e)))?;
                builder.multipart(form.part(file.field, part))
            }
        };

        let resp = builder
            .send()
            .map_err(|e| ApiError::Transport(format!("{} failed: {}", req.path, e)))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| ApiError::Transport(format!("reading {} response: {}", req.path, e)))?;

        Ok(HttpResponse { status, body })
    }
}
