// TaskBackend bound to the remote task service
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::client::TesClient;
use stepexec_core::domain::Operation;
use stepexec_core::port::{PollError, TaskBackend};

/// Receives the terminal snapshot of a task
pub type CompletionHook = Box<dyn Fn(Operation) + Send + Sync>;

/// Polls the task service; terminal = COMPLETE, EXECUTOR_ERROR, SYSTEM_ERROR, CANCELED
pub struct TesTaskBackend {
    client: Arc<TesClient>,
    on_complete: CompletionHook,
}

impl TesTaskBackend {
    pub fn new(client: Arc<TesClient>, on_complete: CompletionHook) -> Self {
        Self {
            client,
            on_complete,
        }
    }
}

#[async_trait]
impl TaskBackend for TesTaskBackend {
    async fn poll(&self, operation: &Operation) -> Result<Operation, PollError> {
        self.client
            .get_task(&operation.id)
            .await
            .map_err(|e| e.into_poll_error(operation.id.clone()))
    }

    fn is_done(&self, operation: &Operation) -> bool {
        operation.state.is_terminal()
    }

    async fn complete(&self, operation: Operation) {
        info!(
            task_id = %operation.id,
            state = %operation.state,
            "Remote task finished"
        );
        (self.on_complete)(operation);
    }
}
