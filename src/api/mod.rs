pub mod auth;
pub mod blogs;
pub mod collection;
pub mod contact;
pub mod content;
pub mod http;
pub mod skills;
pub mod stats;
pub mod upload;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use url::Url;

use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::inflight::{InFlight, InFlightGuard};
use crate::session::Session;

/// Fallback when a failed response carries no `message`.
pub const GENERIC_FAILURE: &str = "API request failed";

// ── Wire types ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart {
        fields: Vec<(String, String)>,
        file: FilePart,
    },
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Endpoint path as passed by the caller, e.g. `/projects/p1`.
    pub path: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

#[cfg(test)]
impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves one request over the wire. `http::HttpTransport` in production.
pub trait Transport: Send + Sync {
    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `{success, data, message}` as every endpoint answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    /// Only a literal `true` counts as success.
    fn from_value(value: Value) -> Self {
        let success = value.get("success") == Some(&Value::Bool(true));
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string());
        let data = match value {
            Value::Object(mut map) => map.remove("data").filter(|d| !d.is_null()),
            _ => None,
        };
        Envelope {
            success,
            data,
            message,
        }
    }

    /// `success != true` becomes `ApiError::Rejected` carrying the server message.
    pub fn into_success(self) -> Result<Envelope, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ))
        }
    }

    /// Decode the whole `data` member.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| ApiError::Decode("response has no data".into()))?;
        serde_json::from_value(data).map_err(ApiError::from)
    }

    /// Decode `data[key]`; an absent or null member yields `T::default()`.
    pub fn member<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, ApiError> {
        match self.data.as_ref().and_then(|d| d.get(key)) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| ApiError::Decode(format!("{}: {}", key, e))),
        }
    }
}

// ── Client ────────────────────────────────────────────

/// Request wrapper shared by every resource client. Cheap to clone; clones
/// share the transport, the session and the in-flight registry.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Session,
    inflight: InFlight,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Session) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            inflight: InFlight::new(),
        }
    }

    pub fn from_config(cfg: &AdminConfig, session: Session) -> Result<Self, ApiError> {
        let timeout = cfg.timeout_secs.map(Duration::from_secs);
        let transport = http::HttpTransport::new(timeout)?;
        Ok(ApiClient::new(&cfg.api_url, Arc::new(transport), session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Claim `(resource, operation)` for the duration of one mutation.
    pub fn guard(&self, resource: &str, operation: &str) -> Result<InFlightGuard, ApiError> {
        self.inflight.begin(resource, operation)
    }

    fn auth_header(&self) -> Option<(String, String)> {
        self.session
            .token()
            .map(|t| ("Authorization".to_string(), format!("Bearer {}", t)))
    }

    /// JSON request. Returns the parsed envelope unchanged on any 2xx status,
    /// including `success: false`; callers decide what that means.
    pub fn call(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Envelope, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_header());
        let req = HttpRequest {
            method,
            path: endpoint.to_string(),
            url: self.url(endpoint),
            headers,
            body: body.map(Body::Json).unwrap_or(Body::Empty),
        };
        self.execute(req, GENERIC_FAILURE)
    }

    /// Multipart POST. No JSON content type: the transport writes the
    /// multipart boundary header itself.
    pub fn call_multipart(
        &self,
        endpoint: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
        fallback: &str,
    ) -> Result<Envelope, ApiError> {
        let headers = self.auth_header().into_iter().collect();
        let req = HttpRequest {
            method: Method::Post,
            path: endpoint.to_string(),
            url: self.url(endpoint),
            headers,
            body: Body::Multipart { fields, file },
        };
        self.execute(req, fallback)
    }

    fn execute(&self, req: HttpRequest, fallback: &str) -> Result<Envelope, ApiError> {
        let method = req.method;
        let endpoint = req.path.clone();
        log::debug!("[api] {} {}", method, endpoint);

        let result = self
            .transport
            .send(req)
            .and_then(|resp| parse_response(resp, fallback));
        if let Err(ref e) = result {
            log::warn!("[api] {} {} failed: {}", method, endpoint, e);
        }
        result
    }

    /// GET `endpoint`, require success, decode `data`.
    pub fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.call(Method::Get, endpoint, None)?
            .into_success()?
            .data_as()
    }

    /// Send `body` and return the successful envelope.
    pub fn submit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Envelope, ApiError> {
        let body = match body {
            Some(b) => Some(serde_json::to_value(b)?),
            None => None,
        };
        self.call(method, endpoint, body)?.into_success()
    }
}

/// Parse the body whatever the status; non-2xx becomes `ApiError::Http` with
/// the server's message or `fallback`.
fn parse_response(resp: HttpResponse, fallback: &str) -> Result<Envelope, ApiError> {
    let parsed: Result<Value, _> = serde_json::from_str(&resp.body);
    if !resp.is_success() {
        let message = parsed
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(|m| m.to_string()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::Http {
            status: resp.status,
            message,
        });
    }
    match parsed {
        Ok(value @ Value::Object(_)) => Ok(Envelope::from_value(value)),
        Ok(_) => Err(ApiError::Decode("response is not a JSON object".into())),
        Err(e) => Err(ApiError::Decode(format!("malformed JSON: {}", e))),
    }
}

// ── Fan-out ───────────────────────────────────────────

pub type Task<T> = Box<dyn FnOnce() -> Result<T, ApiError> + Send>;

fn spawn_all<T: Send + 'static>(
    tasks: Vec<Task<T>>,
) -> Result<mpsc::Receiver<(usize, Result<T, ApiError>)>, ApiError> {
    let (tx, rx) = mpsc::channel();
    for (idx, task) in tasks.into_iter().enumerate() {
        let tx = tx.clone();
        thread::Builder::new()
            .name(format!("folio-fetch-{}", idx))
            .spawn(move || {
                // Receiver may be gone after an early failure; late results are dropped.
                let _ = tx.send((idx, task()));
            })
            .map_err(|e| ApiError::Transport(format!("cannot spawn request thread: {}", e)))?;
    }
    Ok(rx)
}

/// Run every task concurrently and return results in task order. The first
/// failure is returned as soon as it arrives; tasks still running finish on
/// their own and their results are discarded.
pub fn join_all<T: Send + 'static>(tasks: Vec<Task<T>>) -> Result<Vec<T>, ApiError> {
    let count = tasks.len();
    let rx = spawn_all(tasks)?;
    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    for _ in 0..count {
        let (idx, result) = rx
            .recv()
            .map_err(|_| ApiError::Transport("request thread exited without a result".into()))?;
        slots[idx] = Some(result?);
    }
    Ok(slots.into_iter().flatten().collect())
}

/// Run every task concurrently and wait for all of them, keeping each outcome.
pub fn settle_all<T: Send + 'static>(tasks: Vec<Task<T>>) -> Vec<Result<T, ApiError>> {
    let count = tasks.len();
    let rx = match spawn_all(tasks) {
        Ok(rx) => rx,
        Err(e) => return (0..count).map(|_| Err(e.clone())).collect(),
    };
    let mut slots: Vec<Option<Result<T, ApiError>>> = (0..count).map(|_| None).collect();
    for _ in 0..count {
        match rx.recv() {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(_) => break,
        }
    }
    slots
        .into_iter()
        .map(|s| {
            s.unwrap_or_else(|| Err(ApiError::Transport("request thread exited without a result".into())))
        })
        .collect()
}

/// Percent-encode one path segment so an id can never add segments or a query.
pub fn path_segment(raw: &str) -> String {
    match raw {
        "." => return "%2E".to_string(),
        ".." => return "%2E%2E".to_string(),
        _ => {}
    }
    let mut url = match Url::parse("http://segment.invalid/") {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn path_segment_escapes_separators() {
        assert_eq!(path_segment("65a1f0c2"), "65a1f0c2");
        assert_eq!(path_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(path_segment("50% off"), "50%25%20off");
        assert_eq!(path_segment(".."), "%2E%2E");
    }

    fn resp(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn non_2xx_uses_server_message() {
        match parse_response(resp(401, r#"{"success":false,"message":"Invalid token"}"#), GENERIC_FAILURE) {
            Err(ApiError::Http { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid token");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_2xx_without_json_falls_back() {
        match parse_response(resp(502, "<html>Bad gateway</html>"), GENERIC_FAILURE) {
            Err(ApiError::Http { message, .. }) => assert_eq!(message, GENERIC_FAILURE),
            other => panic!("unexpected {:?}", other),
        }
        match parse_response(resp(500, "{}"), "Upload failed") {
            Err(ApiError::Http { message, .. }) => assert_eq!(message, "Upload failed"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ok_status_with_garbage_is_decode_error() {
        assert!(matches!(
            parse_response(resp(200, "not json"), GENERIC_FAILURE),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_response(resp(200, "[1,2]"), GENERIC_FAILURE),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn envelope_is_returned_unchanged_even_when_unsuccessful() {
        let env = parse_response(resp(200, r#"{"success":false,"message":"nope"}"#), GENERIC_FAILURE).unwrap();
        assert!(!env.success);
        assert_eq!(env.message.as_deref(), Some("nope"));
        assert_eq!(env.into_success(), Err(ApiError::Rejected("nope".into())));
    }

    #[test]
    fn only_literal_true_is_success() {
        let env = parse_response(resp(200, r#"{"success":"true","data":{}}"#), GENERIC_FAILURE).unwrap();
        assert!(!env.success);
        let env = parse_response(resp(200, r#"{"data":{}}"#), GENERIC_FAILURE).unwrap();
        assert!(!env.success);
    }

    #[test]
    fn member_defaults_when_missing() {
        let env = Envelope {
            success: true,
            data: Some(serde_json::json!({"projects": null})),
            message: None,
        };
        let list: Vec<Value> = env.member("projects").unwrap();
        assert!(list.is_empty());
        let other: Vec<Value> = env.member("blogs").unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn join_all_keeps_task_order() {
        let tasks: Vec<Task<usize>> = (0..5usize)
            .map(|i| {
                Box::new(move || {
                    thread::sleep(Duration::from_millis((5 - i as u64) * 5));
                    Ok(i)
                }) as Task<usize>
            })
            .collect();
        assert_eq!(join_all(tasks).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn join_all_returns_first_failure_without_waiting() {
        let finished = Arc::new(AtomicUsize::new(0));
        let slow = Arc::clone(&finished);
        let tasks: Vec<Task<u8>> = vec![
            Box::new(move || {
                thread::sleep(Duration::from_millis(300));
                slow.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            }),
            Box::new(|| Err(ApiError::Transport("refused".into()))),
        ];
        let err = join_all(tasks).unwrap_err();
        assert_eq!(err, ApiError::Transport("refused".into()));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn settle_all_keeps_every_outcome() {
        let tasks: Vec<Task<&'static str>> = vec![
            Box::new(|| Ok("hero")),
            Box::new(|| Err(ApiError::Rejected("about failed".into()))),
            Box::new(|| Ok("footer")),
        ];
        let results = settle_all(tasks);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), &"footer");
    }
}
