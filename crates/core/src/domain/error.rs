// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Cannot read job descriptor {path}: {reason}")]
    DescriptorUnreadable { path: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
