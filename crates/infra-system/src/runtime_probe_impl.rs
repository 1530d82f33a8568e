// Container runtime probes
// reason: tokio::time::timeout bounds each trial run
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use stepexec_core::application::constants::{
    DEFAULT_PROBE_IMAGE, DEFAULT_PROBE_RUNTIME, PROBE_TIMEOUT, USERNS_ACCEPTED_PHRASES,
};
use stepexec_core::port::RuntimeProbe;

/// Trial invocation settings
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Runtime binary (looked up on PATH)
    pub runtime: String,
    /// Minimal test image
    pub image: PathBuf,
    /// Hard limit for one trial
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_PROBE_RUNTIME.to_string(),
            image: PathBuf::from(DEFAULT_PROBE_IMAGE),
            timeout: PROBE_TIMEOUT,
        }
    }
}

/// Whether the trial's stderr shows `--userns` was accepted
///
/// The test image has no shell, so a runtime that understands the flag gets
/// as far as failing on the image; one that does not fails earlier with a
/// different message.
pub fn stderr_shows_userns_support(stderr: &str) -> bool {
    USERNS_ACCEPTED_PHRASES
        .iter()
        .any(|phrase| stderr.contains(phrase))
}

/// Detects Singularity `--userns` support
///
/// Runs `<runtime> exec --userns <image> true`, discards stdout and inspects
/// stderr. A timeout or a runtime that cannot be launched counts as unsupported.
pub struct SingularityUsernsProbe {
    config: ProbeConfig,
}

impl SingularityUsernsProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    async fn trial(&self) -> bool {
        let child = Command::new(&self.config.runtime)
            .args(["exec", "--userns"])
            .arg(&self.config.image)
            .arg("true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(runtime = %self.config.runtime, error = %e, "Runtime not available for probe");
                return false;
            }
        };

        match timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                debug!(stderr = %stderr.trim(), "Userns trial finished");
                stderr_shows_userns_support(&stderr)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Userns trial could not be collected");
                false
            }
            Err(_) => {
                // Child is killed on drop
                warn!(
                    timeout_secs = self.config.timeout.as_secs(),
                    "Userns trial timed out, assuming unsupported"
                );
                false
            }
        }
    }
}

impl Default for SingularityUsernsProbe {
    fn default() -> Self {
        Self::new(ProbeConfig::default())
    }
}

#[async_trait]
impl RuntimeProbe for SingularityUsernsProbe {
    type Output = bool;

    fn name(&self) -> &str {
        "singularity-userns"
    }

    async fn probe(&self) -> bool {
        self.trial().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepexec_core::application::CapabilityCache;

    #[cfg(unix)]
    fn write_fake_runtime(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-runtime");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn config(runtime: String, timeout: Duration) -> ProbeConfig {
        ProbeConfig {
            runtime,
            image: PathBuf::from("hello.simg"),
            timeout,
        }
    }

    #[test]
    fn test_phrases() {
        assert!(stderr_shows_userns_support(
            "ERROR  : No valid /bin/sh in container"
        ));
        assert!(stderr_shows_userns_support(
            "FATAL: exec: \"true\": executable file not found in $PATH"
        ));
        assert!(!stderr_shows_userns_support(
            "ERROR: Unknown option: --userns"
        ));
        assert!(!stderr_shows_userns_support(""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_supported_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = write_fake_runtime(dir.path(), "echo 'No valid /bin/sh in container' >&2; exit 255");

        let probe = SingularityUsernsProbe::new(config(runtime, Duration::from_secs(10)));
        assert!(probe.probe().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unsupported_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = write_fake_runtime(dir.path(), "echo 'unrecognized option --userns' >&2; exit 1");

        let probe = SingularityUsernsProbe::new(config(runtime, Duration::from_secs(10)));
        assert!(!probe.probe().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = write_fake_runtime(dir.path(), "sleep 10; echo 'No valid /bin/sh' >&2");

        let probe = SingularityUsernsProbe::new(config(runtime, Duration::from_millis(200)));
        let started = std::time::Instant::now();

        assert!(!probe.probe().await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_runtime_is_unsupported() {
        let probe = SingularityUsernsProbe::new(config(
            "no-such-container-runtime-xyz".to_string(),
            Duration::from_secs(1),
        ));
        assert!(!probe.probe().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cached_answer_survives_runtime_change() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = write_fake_runtime(dir.path(), "echo 'No valid /bin/sh' >&2");
        let cache = CapabilityCache::new(SingularityUsernsProbe::new(config(
            runtime,
            Duration::from_secs(10),
        )));

        assert!(cache.get().await);

        // Runtime "upgraded" to one that rejects the flag
        write_fake_runtime(dir.path(), "echo 'unknown flag' >&2; exit 1");
        assert!(cache.get().await);
    }
}
