// Remote Operation Domain Model

use serde::{Deserialize, Serialize};

/// Remote task identifier (assigned by the backend)
pub type OperationId = String;

/// Lifecycle state of a remotely executed task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    Queued,
    Initializing,
    Running,
    Paused,
    Complete,
    ExecutorError,
    SystemError,
    Canceled,
    /// Any tag this client does not recognize
    #[default]
    #[serde(other)]
    Unknown,
}

impl OperationState {
    /// Terminal states: no further transition occurs
    pub const TERMINAL: [OperationState; 4] = [
        OperationState::Complete,
        OperationState::ExecutorError,
        OperationState::SystemError,
        OperationState::Canceled,
    ];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    pub fn is_success(self) -> bool {
        self == OperationState::Complete
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationState::Unknown => write!(f, "UNKNOWN"),
            OperationState::Queued => write!(f, "QUEUED"),
            OperationState::Initializing => write!(f, "INITIALIZING"),
            OperationState::Running => write!(f, "RUNNING"),
            OperationState::Paused => write!(f, "PAUSED"),
            OperationState::Complete => write!(f, "COMPLETE"),
            OperationState::ExecutorError => write!(f, "EXECUTOR_ERROR"),
            OperationState::SystemError => write!(f, "SYSTEM_ERROR"),
            OperationState::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Observable snapshot of a remote task
///
/// Backend-specific fields are kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    #[serde(default)]
    pub state: OperationState,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Operation {
    pub fn new(id: impl Into<OperationId>, state: OperationState) -> Self {
        Self {
            id: id.into(),
            state,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_state(&self, state: OperationState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}
