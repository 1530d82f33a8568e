// TaskPoller - drives one remote Operation to a terminal state

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use super::cancel::CancelToken;
use super::constants::DEFAULT_POLL_INTERVAL;
use crate::domain::Operation;
use crate::port::{PollError, TaskBackend};

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Constant delay between two polls (no backoff)
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Tracks a single remotely submitted task
///
/// Loop: while the backend says the current snapshot is not done, wait one
/// interval and replace the snapshot with a fresh `poll`. The terminal
/// snapshot is handed to `complete` exactly once.
///
/// A poll error ends the loop and is returned to the owner; `complete` is
/// not called and the poll is not retried.
///
/// # Example
/// ```text
/// let handle = TaskPoller::new(operation, backend)
///     .with_interval(Duration::from_secs(2))
///     .spawn();
/// let terminal = handle.await??;
/// ```
pub struct TaskPoller {
    operation: Operation,
    config: PollerConfig,
    backend: Arc<dyn TaskBackend>,
    cancel: Option<CancelToken>,
}

impl TaskPoller {
    pub fn new(operation: Operation, backend: Arc<dyn TaskBackend>) -> Self {
        Self {
            operation,
            config: PollerConfig::default(),
            backend,
            cancel: None,
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Stop polling early when `token` fires; `complete` is then skipped
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Latest snapshot returned by the backend
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Run the polling loop on the current task
    ///
    /// Returns the terminal snapshot after `complete` ran.
    pub async fn run(mut self) -> Result<Operation, PollError> {
        info!(
            operation_id = %self.operation.id,
            state = %self.operation.state,
            interval_ms = self.config.interval.as_millis() as u64,
            "Poller started"
        );

        while !self.backend.is_done(&self.operation) {
            self.wait_interval().await?;

            debug!(operation_id = %self.operation.id, "Polling operation");
            self.operation = self.backend.poll(&self.operation).await?;
        }

        info!(
            operation_id = %self.operation.id,
            state = %self.operation.state,
            "Operation reached terminal state"
        );

        self.backend.complete(self.operation.clone()).await;
        Ok(self.operation)
    }

    /// Run the polling loop as its own tokio task
    ///
    /// Failures (poll errors, cancellation, panics in the backend) surface
    /// through the returned handle.
    pub fn spawn(self) -> JoinHandle<Result<Operation, PollError>> {
        tokio::spawn(self.run())
    }

    async fn wait_interval(&mut self) -> Result<(), PollError> {
        let interval = self.config.interval;

        let Some(token) = self.cancel.as_mut() else {
            sleep(interval).await;
            return Ok(());
        };

        if token.is_cancelled() {
            return Err(PollError::Cancelled(self.operation.id.clone()));
        }

        tokio::select! {
            _ = sleep(interval) => Ok(()),
            _ = token.cancelled() => {
                info!(operation_id = %self.operation.id, "Poller cancelled");
                Err(PollError::Cancelled(self.operation.id.clone()))
            }
        }
    }
}
