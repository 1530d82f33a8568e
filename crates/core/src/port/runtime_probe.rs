// Container runtime probe port
// reason: async-trait for probes that shell out to the runtime
use async_trait::async_trait;

/// Identity (uid/gid) of the docker user inside a virtualized runtime (boot2docker, docker-machine)
///
/// Both fields are `None` when no VM-backed runtime is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmIdentity {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

/// One environment capability check
///
/// The answer is expected to be fixed for the lifetime of the process, so
/// callers wrap probes in a `CapabilityCache` instead of calling `probe` directly.
#[async_trait]
pub trait RuntimeProbe: Send + Sync {
    type Output: Clone + std::fmt::Debug + Send + Sync;

    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run the check; must not fail (unsupported/unknown is an answer)
    async fn probe(&self) -> Self::Output;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Probe whose answer can be flipped between calls
    pub struct ToggleProbe {
        answer: AtomicBool,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ToggleProbe {
        pub fn new(answer: bool) -> Self {
            Self {
                answer: AtomicBool::new(answer),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        /// Slow the probe down so concurrent first queries overlap
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn set_answer(&self, answer: bool) {
            self.answer.store(answer, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RuntimeProbe for ToggleProbe {
        type Output = bool;

        fn name(&self) -> &str {
            "toggle"
        }

        async fn probe(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.load(Ordering::SeqCst)
        }
    }
}
