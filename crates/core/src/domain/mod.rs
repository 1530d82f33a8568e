// Domain Layer - Job descriptors, remote operations, environment rules

pub mod environment;
pub mod error;
pub mod job;
pub mod operation;

// Re-exports
pub use environment::{EnvironmentDiff, EXCLUDED_VARIABLES, RUNTIME_MARKER_VAR};
pub use error::DomainError;
pub use job::{EnvMap, JobDescriptor};
pub use operation::{Operation, OperationId, OperationState};
