// Stepexec Infrastructure - Remote Task Execution Service
// Implements: TaskBackend over the task service HTTP API

pub mod backend;
pub mod client;
pub mod error;

pub use backend::{CompletionHook, TesTaskBackend};
pub use client::TesClient;
pub use error::BackendError;
