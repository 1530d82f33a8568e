// Application Layer - Use Cases and Orchestration

mod cancel;
pub mod capability;
pub mod constants;
pub mod local_run;
pub mod poller;

// Re-exports
pub use cancel::{cancel_channel, CancelSender, CancelToken};
pub use capability::{CapabilityCache, CapabilityFlag};
pub use local_run::LocalRunService;
pub use poller::{PollerConfig, TaskPoller};
