// Task service HTTP client
// reason: reqwest for the JSON-over-HTTP task API
use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use stepexec_core::domain::{Operation, OperationId};

/// Normalize a service address: default to http, no trailing slash
pub fn normalize_address(addr: &str) -> String {
    let addr = addr.trim();
    let with_scheme = if addr.starts_with("http") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Extract the task id from a submit response
///
/// A response carrying an `Error` field is a rejection.
pub fn task_id_from_response(body: &Value) -> Result<OperationId, BackendError> {
    if let Some(error) = body.get("Error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(BackendError::Rejected(message));
    }

    body.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BackendError::InvalidResponse(format!("missing 'id' in {}", body)))
}

/// Minimal client: submit a task, fetch its state
pub struct TesClient {
    addr: String,
    http: reqwest::Client,
}

impl TesClient {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: normalize_address(addr),
            http: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS)
    pub fn with_http_client(addr: &str, http: reqwest::Client) -> Self {
        Self {
            addr: normalize_address(addr),
            http,
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    /// Submit a task document; returns the id assigned by the service
    pub async fn submit(&self, task: &Value) -> Result<OperationId, BackendError> {
        let url = format!("{}/v1/tasks", self.addr);
        let body: Value = self.http.post(&url).json(task).send().await?.json().await?;

        let id = task_id_from_response(&body)?;
        debug!(task_id = %id, url = %url, "Task submitted");
        Ok(id)
    }

    /// Current snapshot of a task
    pub async fn get_task(&self, id: &str) -> Result<Operation, BackendError> {
        let url = format!("{}/v1/tasks/{}", self.addr, id);
        let body: Value = self.http.get(&url).send().await?.json().await?;

        serde_json::from_value(body)
            .map_err(|e| BackendError::InvalidResponse(format!("task {}: {}", id, e)))
    }
}
