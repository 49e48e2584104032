use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::ApiError;

/// Registry of mutations currently on the wire, keyed by (resource, operation).
/// A second call for a key that is already registered is rejected rather than
/// queued, so a double submit never reaches the server twice.
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Holds a key for the lifetime of one request. Dropping it releases the key.
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    pub fn new() -> Self {
        InFlight {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim `(resource, operation)`. Fails with `ApiError::Busy` when the same
    /// key is already held.
    pub fn begin(&self, resource: &str, operation: &str) -> Result<InFlightGuard, ApiError> {
        let key = format!("{}:{}", resource, operation);
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.clone()) {
            log::warn!("[api] rejected duplicate {} {}", resource, operation);
            return Err(ApiError::Busy {
                resource: resource.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, resource: &str, operation: &str) -> bool {
        let key = format!("{}:{}", resource, operation);
        self.keys
            .lock()
            .map(|k| k.contains(&key))
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.keys.lock().map(|k| k.len()).unwrap_or(0)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}
