// Docker VM identity probe (boot2docker / docker-machine)
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use stepexec_core::application::constants::PROBE_TIMEOUT;
use stepexec_core::port::{RuntimeProbe, VmIdentity};

/// Finds the uid/gid docker uses inside a VM-backed runtime
///
/// On hosts where docker runs inside a VirtualBox VM (boot2docker,
/// docker-machine) the user owning shared folders differs from the host user.
/// Reports `VmIdentity::default()` when neither tool has a running VM.
pub struct DockerVmIdProbe {
    timeout: Duration,
}

impl DockerVmIdProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Trimmed stdout of a successful command; None on any failure
    async fn output_of(&self, cmd: &[&str]) -> Option<String> {
        let (program, args) = cmd.split_first()?;
        let run = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, run).await {
            Ok(Ok(output)) if output.status.success() => output,
            Ok(Ok(_)) | Ok(Err(_)) | Err(_) => return None,
        };

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn output_matches(&self, cmd: &[&str], expected: &str) -> bool {
        self.output_of(cmd).await.as_deref() == Some(expected)
    }

    async fn output_as_id(&self, cmd: &[&str]) -> Option<u32> {
        parse_id(&self.output_of(cmd).await?)
    }

    async fn boot2docker_identity(&self) -> Option<VmIdentity> {
        if !self.output_matches(&["boot2docker", "status"], "running").await {
            return None;
        }
        Some(VmIdentity {
            uid: self.output_as_id(&["boot2docker", "ssh", "id", "-u"]).await,
            gid: self.output_as_id(&["boot2docker", "ssh", "id", "-g"]).await,
        })
    }

    async fn docker_machine_identity(&self) -> Option<VmIdentity> {
        let machine = self.output_of(&["docker-machine", "active"]).await?;
        if machine.is_empty()
            || !self
                .output_matches(&["docker-machine", "status", &machine], "Running")
                .await
        {
            return None;
        }
        Some(VmIdentity {
            uid: self
                .output_as_id(&["docker-machine", "ssh", &machine, "id -u"])
                .await,
            gid: self
                .output_as_id(&["docker-machine", "ssh", &machine, "id -g"])
                .await,
        })
    }
}

impl Default for DockerVmIdProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

fn parse_id(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

#[async_trait]
impl RuntimeProbe for DockerVmIdProbe {
    type Output = VmIdentity;

    fn name(&self) -> &str {
        "docker-vm-id"
    }

    async fn probe(&self) -> VmIdentity {
        let identity = match self.boot2docker_identity().await {
            Some(identity) => identity,
            None => self.docker_machine_identity().await.unwrap_or_default(),
        };
        debug!(uid = ?identity.uid, gid = ?identity.gid, "Docker VM identity resolved");
        identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1000"), Some(1000));
        assert_eq!(parse_id(" 50\n"), Some(50));
        assert_eq!(parse_id("uid=1000(docker)"), None);
        assert_eq!(parse_id(""), None);
    }

    #[tokio::test]
    async fn test_missing_tools_yield_none() {
        let probe = DockerVmIdProbe::new(Duration::from_secs(5));
        assert_eq!(probe.output_of(&["no-such-vm-tool-xyz", "status"]).await, None);
        assert_eq!(probe.output_of(&[]).await, None);
    }

    #[tokio::test]
    async fn test_output_is_trimmed() {
        let probe = DockerVmIdProbe::new(Duration::from_secs(5));
        assert_eq!(
            probe.output_of(&["echo", "  running  "]).await.as_deref(),
            Some("running")
        );
        assert!(probe.output_matches(&["echo", "running"], "running").await);
        assert_eq!(probe.output_as_id(&["echo", "42"]).await, Some(42));
    }

    #[tokio::test]
    async fn test_failing_command_yields_none() {
        let probe = DockerVmIdProbe::new(Duration::from_secs(5));
        assert_eq!(probe.output_of(&["sh", "-c", "echo 1000; exit 1"]).await, None);
    }
}
