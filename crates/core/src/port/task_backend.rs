// Task Backend Port
// Backend-specific strategy driven by the TaskPoller

use crate::domain::{Operation, OperationId};
use async_trait::async_trait;
use thiserror::Error;

/// Polling errors
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Backend error while polling {id}: {message}")]
    Backend { id: OperationId, message: String },

    #[error("Polling cancelled for operation {0}")]
    Cancelled(OperationId),
}

/// Remote backend bound to a TaskPoller
///
/// All three operations are required; there is no default behavior.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Fetch a fresh snapshot of `operation`
    ///
    /// # Errors
    /// - PollError::Backend if the remote service cannot be reached or answers garbage
    async fn poll(&self, operation: &Operation) -> Result<Operation, PollError>;

    /// Whether `operation` reached a terminal state
    fn is_done(&self, operation: &Operation) -> bool;

    /// Completion hook, invoked exactly once with the terminal snapshot
    async fn complete(&self, operation: Operation);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::OperationState;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed sequence of poll outcomes
    ///
    /// Once the script runs out, the last operation seen is returned again.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<OperationState, String>>>,
        poll_count: Arc<Mutex<usize>>,
        completed: Arc<Mutex<Vec<Operation>>>,
    }

    impl ScriptedBackend {
        pub fn new(states: impl IntoIterator<Item = OperationState>) -> Self {
            Self::with_results(states.into_iter().map(Ok))
        }

        /// `Err(message)` entries make the matching poll call fail
        pub fn with_results(results: impl IntoIterator<Item = Result<OperationState, String>>) -> Self {
            Self {
                script: Mutex::new(results.into_iter().collect()),
                poll_count: Arc::new(Mutex::new(0)),
                completed: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn poll_count(&self) -> usize {
            *self.poll_count.lock().unwrap()
        }

        pub fn completed(&self) -> Vec<Operation> {
            self.completed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskBackend for ScriptedBackend {
        async fn poll(&self, operation: &Operation) -> Result<Operation, PollError> {
            *self.poll_count.lock().unwrap() += 1;

            match self.script.lock().unwrap().pop_front() {
                Some(Ok(state)) => Ok(operation.with_state(state)),
                Some(Err(message)) => Err(PollError::Backend {
                    id: operation.id.clone(),
                    message,
                }),
                None => Ok(operation.clone()),
            }
        }

        fn is_done(&self, operation: &Operation) -> bool {
            operation.state.is_terminal()
        }

        async fn complete(&self, operation: Operation) {
            self.completed.lock().unwrap().push(operation);
        }
    }
}
