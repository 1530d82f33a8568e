// Job Executor Port
// Abstraction for running one JobDescriptor to completion

use crate::domain::JobDescriptor;
use async_trait::async_trait;
use thiserror::Error;

/// Numeric exit status of a finished job
///
/// Signal terminations are reported as `-signo` on Unix.
pub type ExitCode = i32;

/// Execution errors
///
/// A non-zero exit code is NOT an error; it is returned as data.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Invalid job descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Cannot open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Setup script not found: {0}")]
    ScriptNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Job Executor trait
///
/// Implementations:
/// - LocalProcessExecutor: spawns the job as a child process
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Execute a job and return its exit code
    ///
    /// # Errors
    /// - ExecutionError::OpenFailed if a stdio path cannot be opened
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::IoError if waiting on the child fails
    async fn execute(&self, job: &JobDescriptor) -> Result<ExitCode, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every job it receives and answers with a fixed exit code
    pub struct RecordingExecutor {
        exit_code: ExitCode,
        jobs: Arc<Mutex<Vec<JobDescriptor>>>,
    }

    impl RecordingExecutor {
        pub fn new(exit_code: ExitCode) -> Self {
            Self {
                exit_code,
                jobs: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn jobs(&self) -> Vec<JobDescriptor> {
            self.jobs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobExecutor for RecordingExecutor {
        async fn execute(&self, job: &JobDescriptor) -> Result<ExitCode, ExecutionError> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(self.exit_code)
        }
    }
}
