// Port Layer - Interfaces for external dependencies

pub mod environment_preparer;
pub mod job_executor;
pub mod runtime_probe;
pub mod task_backend;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use environment_preparer::EnvironmentPreparer;
pub use job_executor::{ExecutionError, ExitCode, JobExecutor};
pub use runtime_probe::{RuntimeProbe, VmIdentity};
pub use task_backend::{PollError, TaskBackend};
pub use time_provider::TimeProvider;
