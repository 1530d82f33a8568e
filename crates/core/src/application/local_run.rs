// Local run use case: optional environment capture, then execution

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::domain::JobDescriptor;
use crate::error::Result;
use crate::port::{EnvironmentPreparer, ExitCode, JobExecutor};

/// Runs a job locally, optionally preceded by a setup script
pub struct LocalRunService {
    executor: Arc<dyn JobExecutor>,
    preparer: Arc<dyn EnvironmentPreparer>,
}

impl LocalRunService {
    pub fn new(executor: Arc<dyn JobExecutor>, preparer: Arc<dyn EnvironmentPreparer>) -> Self {
        Self { executor, preparer }
    }

    /// Execute `job` and return the child's exit code
    ///
    /// With `setup_script`, the environment it produces supersedes the
    /// descriptor's `env` for this run only; `job` itself is left as is.
    pub async fn run(&self, job: &JobDescriptor, setup_script: Option<&Path>) -> Result<ExitCode> {
        let exit_code = match setup_script {
            Some(script) => {
                let env = self.preparer.prepare(job.env(), script).await?;
                info!(
                    script = %script.display(),
                    variables = env.len(),
                    "Environment prepared by setup script"
                );
                let prepared = job.clone().with_env(env);
                self.executor.execute(&prepared).await?
            }
            None => self.executor.execute(job).await?,
        };

        Ok(exit_code)
    }
}
