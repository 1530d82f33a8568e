// Environment capture via setup script
// reason: tokio::process so the script does not block the runtime
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use stepexec_core::application::constants::{ENV_OUTPUT_FILE, SETUP_SHELL};
use stepexec_core::domain::{EnvMap, EnvironmentDiff, RUNTIME_MARKER_VAR};
use stepexec_core::port::{EnvironmentPreparer, ExecutionError};

/// Runs a setup script (e.g. module loads) and folds the variables it
/// exports into the job environment
///
/// The script is run as `bash <script>` inside `work_dir` and is expected to
/// dump its final environment to `output_environment.dat` there, for example
/// with `env -0 > output_environment.dat` or `env > output_environment.dat`.
/// Captures sharing one instance run one at a time, since they share that file.
pub struct EnvironmentCapture {
    work_dir: PathBuf,
    shell: String,
    output_lock: Mutex<()>,
}

impl EnvironmentCapture {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            shell: SETUP_SHELL.to_string(),
            output_lock: Mutex::new(()),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(ENV_OUTPUT_FILE)
    }

    /// Environment handed to the script: input, marker, and a `PATH` to find tools
    fn script_env(env: &EnvMap) -> EnvMap {
        let mut exec_env = env.clone();
        exec_env.insert(RUNTIME_MARKER_VAR.to_string(), "1".to_string());
        if !exec_env.contains_key("PATH") {
            if let Ok(path) = std::env::var("PATH") {
                exec_env.insert("PATH".to_string(), path);
            }
        }
        exec_env
    }

    /// Delete the output file; a file that is already gone is fine
    async fn discard_output(&self) -> Result<(), std::io::Error> {
        match tokio::fs::remove_file(self.output_path()).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    async fn capture(&self, env: &EnvMap, script: &Path) -> Result<EnvMap, ExecutionError> {
        if !script.is_file() {
            return Err(ExecutionError::ScriptNotFound(script.display().to_string()));
        }

        let _guard = self.output_lock.lock().await;

        // A file left by an earlier run must never be read as this run's result
        self.discard_output().await.map_err(|e| {
            ExecutionError::IoError(format!("cannot clear {}: {}", self.output_path().display(), e))
        })?;

        info!(script = %script.display(), work_dir = %self.work_dir.display(), "Running setup script");

        // stdout/stderr stay attached to ours so diagnostics are visible
        let status = Command::new(&self.shell)
            .arg(script)
            .env_clear()
            .envs(Self::script_env(env))
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.shell, e)))?;

        if !status.success() {
            warn!(
                script = %script.display(),
                exit_code = ?status.code(),
                "Error while using setup script to modify environment, continuing without it"
            );
            return Ok(env.clone());
        }

        let output_path = self.output_path();
        let data = match tokio::fs::read_to_string(&output_path).await {
            Ok(data) => {
                if let Err(e) = self.discard_output().await {
                    debug!(path = %output_path.display(), error = %e, "Environment file not removed");
                }
                data
            }
            Err(e) => {
                warn!(
                    path = %output_path.display(),
                    error = %e,
                    "Setup script left no readable environment file, continuing without it"
                );
                return Ok(env.clone());
            }
        };

        let diff = EnvironmentDiff::parse(&data);
        info!(variables = diff.len(), "Setup script environment captured");

        Ok(diff.merge_into(env))
    }
}

#[async_trait]
impl EnvironmentPreparer for EnvironmentCapture {
    async fn prepare(&self, env: &EnvMap, script: &Path) -> Result<EnvMap, ExecutionError> {
        self.capture(env, script).await
    }
}
