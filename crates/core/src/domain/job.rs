// Job Descriptor Domain Model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error::{DomainError, Result};

/// Environment variable map (name -> value)
pub type EnvMap = HashMap<String, String>;

/// Fully resolved description of one command execution
///
/// Immutable once constructed: the `with_*` methods consume the descriptor
/// and return a new one, so the caller's copy is never touched by an executor.
///
/// On disk this is the JSON record:
/// ```text
/// {
///   "commands": ["echo", "hi"],
///   "cwd": "/work",
///   "env": {"LANG": "C"},
///   "stdin_path": null,
///   "stdout_path": "out.txt",
///   "stderr_path": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    commands: Vec<String>,
    cwd: PathBuf,
    #[serde(default)]
    env: EnvMap,
    #[serde(default)]
    stdin_path: Option<PathBuf>,
    #[serde(default)]
    stdout_path: Option<PathBuf>,
    #[serde(default)]
    stderr_path: Option<PathBuf>,
}

impl JobDescriptor {
    /// Create a descriptor with an empty environment and inherited/piped stdio
    ///
    /// # Errors
    /// - DomainError::InvalidDescriptor if `commands` is empty
    /// - DomainError::ValidationError if the program name is blank
    pub fn new(commands: Vec<String>, cwd: impl Into<PathBuf>) -> Result<Self> {
        let job = Self {
            commands,
            cwd: cwd.into(),
            env: EnvMap::new(),
            stdin_path: None,
            stdout_path: None,
            stderr_path: None,
        };
        job.validate()?;
        Ok(job)
    }

    /// Parse a descriptor from its JSON representation
    pub fn from_json(data: &str) -> Result<Self> {
        let job: Self = serde_json::from_str(data)
            .map_err(|e| DomainError::InvalidDescriptor(e.to_string()))?;
        job.validate()?;
        Ok(job)
    }

    /// Load and parse a descriptor file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data =
            std::fs::read_to_string(path).map_err(|e| DomainError::DescriptorUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_json(&data)
    }

    fn validate(&self) -> Result<()> {
        match self.commands.first() {
            None => Err(DomainError::InvalidDescriptor(
                "'commands' must contain at least the program".to_string(),
            )),
            Some(program) if program.trim().is_empty() => Err(DomainError::ValidationError(
                "program name must not be blank".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    pub fn with_env(self, env: EnvMap) -> Self {
        Self { env, ..self }
    }

    pub fn with_stdin(self, path: impl Into<PathBuf>) -> Self {
        Self {
            stdin_path: Some(path.into()),
            ..self
        }
    }

    pub fn with_stdout(self, path: impl Into<PathBuf>) -> Self {
        Self {
            stdout_path: Some(path.into()),
            ..self
        }
    }

    pub fn with_stderr(self, path: impl Into<PathBuf>) -> Self {
        Self {
            stderr_path: Some(path.into()),
            ..self
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Program and its arguments
    pub fn program(&self) -> (&str, &[String]) {
        // validate() guarantees at least one element for every constructed descriptor
        match self.commands.split_first() {
            Some((program, args)) => (program.as_str(), args),
            None => ("", &[]),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env(&self) -> &EnvMap {
        &self.env
    }

    pub fn stdin_path(&self) -> Option<&Path> {
        self.stdin_path.as_deref()
    }

    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout_path.as_deref()
    }

    pub fn stderr_path(&self) -> Option<&Path> {
        self.stderr_path.as_deref()
    }
}
