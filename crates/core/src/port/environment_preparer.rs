// Environment Preparer Port
// Runs a setup script and returns the environment the job should see

use crate::domain::EnvMap;
use crate::port::ExecutionError;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait EnvironmentPreparer: Send + Sync {
    /// Run `script` with `env` bound and fold the variables it sets into a copy of `env`
    ///
    /// A failing script degrades to returning `env` unchanged.
    ///
    /// # Errors
    /// - ExecutionError::ScriptNotFound if `script` does not exist
    /// - ExecutionError::SpawnFailed if the shell cannot be started
    async fn prepare(&self, env: &EnvMap, script: &Path) -> Result<EnvMap, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::EnvironmentDiff;

    /// Pretends the script printed `output`
    pub struct StaticPreparer {
        output: String,
    }

    impl StaticPreparer {
        pub fn new(output: impl Into<String>) -> Self {
            Self {
                output: output.into(),
            }
        }
    }

    #[async_trait]
    impl EnvironmentPreparer for StaticPreparer {
        async fn prepare(&self, env: &EnvMap, _script: &Path) -> Result<EnvMap, ExecutionError> {
            Ok(EnvironmentDiff::parse(&self.output).merge_into(env))
        }
    }
}
