// Remote service error types

use stepexec_core::port::PollError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request rejected by task service: {0}")]
    Rejected(String),

    #[error("Invalid response from task service: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Attach the operation being polled
    pub fn into_poll_error(self, id: impl Into<String>) -> PollError {
        PollError::Backend {
            id: id.into(),
            message: self.to_string(),
        }
    }
}
