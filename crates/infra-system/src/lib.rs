// Stepexec Infrastructure - System Adapters
// Implements: JobExecutor, EnvironmentPreparer, RuntimeProbe

pub mod docker_vm;
pub mod env_capture;
pub mod local_executor;
pub mod runtime_probe_impl;

pub use docker_vm::DockerVmIdProbe;
pub use env_capture::EnvironmentCapture;
pub use local_executor::LocalProcessExecutor;
pub use runtime_probe_impl::{ProbeConfig, SingularityUsernsProbe};
