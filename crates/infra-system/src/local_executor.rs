// Local process executor
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use stepexec_core::application::constants::UNKNOWN_EXIT_CODE;
use stepexec_core::domain::{EnvMap, JobDescriptor};
use stepexec_core::port::{ExecutionError, ExitCode, JobExecutor, TimeProvider};

/// Stdio wiring for one child process
///
/// Owns every file opened for the job; dropping it releases them.
struct StdioBindings {
    stdin: Stdio,
    stdout: Stdio,
    stderr: Stdio,
}

impl StdioBindings {
    /// Open the descriptor's paths
    ///
    /// - stdin: the file, or a pipe the executor closes right after spawn
    /// - stdout/stderr: the file (truncate-or-create), or this process's stderr
    ///
    /// Files opened before a failing one are closed on return.
    fn open(job: &JobDescriptor) -> Result<Self, ExecutionError> {
        let stdin = match job.stdin_path() {
            Some(path) => Stdio::from(File::open(path).map_err(|e| open_failed(path, e))?),
            None => Stdio::piped(),
        };
        let stdout = Self::output(job.stdout_path())?;
        let stderr = Self::output(job.stderr_path())?;

        Ok(Self {
            stdin,
            stdout,
            stderr,
        })
    }

    fn output(path: Option<&Path>) -> Result<Stdio, ExecutionError> {
        match path {
            Some(path) => Ok(Stdio::from(
                File::create(path).map_err(|e| open_failed(path, e))?,
            )),
            // Job output never goes to our stdout
            None => Ok(Stdio::from(std::io::stderr())),
        }
    }
}

fn open_failed(path: &Path, err: std::io::Error) -> ExecutionError {
    ExecutionError::OpenFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Convert a child's exit status; signals map to `-signo` on Unix
fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => signal_exit_code(status),
    }
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signo| -signo).unwrap_or(UNKNOWN_EXIT_CODE)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> ExitCode {
    UNKNOWN_EXIT_CODE
}

/// Local process executor
///
/// Runs the descriptor's argument vector directly (no shell) in its `cwd`,
/// with exactly the descriptor's environment plus the ambient `PATH`.
pub struct LocalProcessExecutor {
    time_provider: Arc<dyn TimeProvider>,
    path: Option<OsString>,
}

impl LocalProcessExecutor {
    /// Create an executor that injects this process's `PATH`
    ///
    /// # Example
    /// ```ignore
    /// let executor = LocalProcessExecutor::new(Arc::new(SystemTimeProvider));
    /// let code = executor.execute(&job).await?;
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            path: std::env::var_os("PATH"),
        }
    }

    /// Override the `PATH` injected into every job
    pub fn with_path(mut self, path: impl Into<OsString>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Job environment with the ambient `PATH` forced in
    fn effective_env(&self, env: &EnvMap) -> HashMap<OsString, OsString> {
        let mut effective: HashMap<OsString, OsString> = env
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();

        if let Some(path) = &self.path {
            effective.insert(OsString::from("PATH"), path.clone());
        }
        effective
    }

    /// Build the command and start the child
    ///
    /// The Command (and the parent's copies of the bound files) is dropped
    /// when this returns, so only the child keeps them open.
    fn spawn(&self, job: &JobDescriptor, bindings: StdioBindings) -> Result<Child, ExecutionError> {
        let (program, args) = job.program();
        if program.is_empty() {
            return Err(ExecutionError::InvalidDescriptor(
                "'commands' is empty".to_string(),
            ));
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .env_clear()
            .envs(self.effective_env(job.env()))
            .current_dir(job.cwd())
            .stdin(bindings.stdin)
            .stdout(bindings.stdout)
            .stderr(bindings.stderr);

        command
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", program, e)))
    }

    async fn execute_internal(&self, job: &JobDescriptor) -> Result<ExitCode, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            commands = ?job.commands(),
            cwd = %job.cwd().display(),
            stdin = ?job.stdin_path(),
            stdout = ?job.stdout_path(),
            stderr = ?job.stderr_path(),
            "Starting local job"
        );

        let bindings = StdioBindings::open(job)?;
        let mut child = self.spawn(job, bindings)?;

        // Child sees end-of-input instead of waiting on us
        if let Some(stdin) = child.stdin.take() {
            drop(stdin);
            debug!("Closed parent side of child stdin pipe");
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;

        let code = exit_code(status);
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            exit_code = code,
            duration_ms = %duration_ms,
            "Local job finished"
        );

        Ok(code)
    }
}

#[async_trait]
impl JobExecutor for LocalProcessExecutor {
    async fn execute(&self, job: &JobDescriptor) -> Result<ExitCode, ExecutionError> {
        self.execute_internal(job).await
    }
}
