// Write-once capability cache (one probe run per process)

use tokio::sync::OnceCell;
use tracing::info;

use crate::port::RuntimeProbe;

/// Tri-state view of a boolean capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityFlag {
    Unknown,
    Supported,
    Unsupported,
}

impl From<Option<bool>> for CapabilityFlag {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => CapabilityFlag::Unknown,
            Some(true) => CapabilityFlag::Supported,
            Some(false) => CapabilityFlag::Unsupported,
        }
    }
}

/// Memoizes a RuntimeProbe answer
///
/// Unknown until the first `get`; fixed afterwards. Concurrent first queries
/// wait on a single probe run and all observe its result. Owned by whatever
/// component makes runtime decisions and passed around explicitly (share it
/// through an `Arc`).
pub struct CapabilityCache<P: RuntimeProbe> {
    probe: P,
    value: OnceCell<P::Output>,
}

impl<P: RuntimeProbe> CapabilityCache<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            value: OnceCell::new(),
        }
    }

    /// Cached answer, probing on first use
    pub async fn get(&self) -> P::Output {
        self.value
            .get_or_init(|| async {
                let answer = self.probe.probe().await;
                info!(probe = %self.probe.name(), answer = ?answer, "Runtime capability probed");
                answer
            })
            .await
            .clone()
    }

    /// Cached answer without probing
    pub fn peek(&self) -> Option<&P::Output> {
        self.value.get()
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}

impl<P: RuntimeProbe<Output = bool>> CapabilityCache<P> {
    pub fn flag(&self) -> CapabilityFlag {
        CapabilityFlag::from(self.peek().copied())
    }
}
