//! Running the diagnostic command.
//!
//! The command is located on `PATH` plus the vendor driver directories and
//! run with a cleared environment and a bounded timeout. A child that
//! outlives its timeout is killed when its future is dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use adk_core::{DetectionError, ProbeSettings};
use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::env::{process_safe_environment, search_path};

/// A single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    /// Program name for messages.
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit status as reported by the OS, e.g. `exit status: 1`.
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// The command did not produce output.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

impl From<CommandError> for DetectionError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Spawn { program, reason } => Self::CommandFailed {
                command: program,
                status: "not started".to_string(),
                stderr: reason,
            },
            CommandError::TimedOut { program, timeout } => Self::Timeout {
                command: program,
                timeout,
            },
        }
    }
}

/// Seam between the probe and process execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve `program` to an executable path.
    fn locate(&self, program: &str) -> Result<PathBuf, DetectionError>;

    /// Run `spec` to completion or until its timeout expires.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    env_allowlist: Vec<String>,
    search_dirs: Vec<PathBuf>,
}

impl TokioCommandRunner {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            env_allowlist: settings.env_allowlist.clone(),
            search_dirs: settings.search_dirs.clone(),
        }
    }

    /// Variables the child will see.
    pub fn child_environment(&self) -> Vec<(String, OsString)> {
        process_safe_environment(&self.env_allowlist, &self.search_dirs)
    }

    fn not_installed(&self, program: &str) -> DetectionError {
        DetectionError::DriverNotInstalled {
            command: program.to_string(),
            searched: self.search_dirs.clone(),
        }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    fn locate(&self, program: &str) -> Result<PathBuf, DetectionError> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(self.not_installed(program))
            };
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, search_path(&self.search_dirs), cwd)
            .map_err(|_| self.not_installed(program))
    }

    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let program = spec.display_name();
        debug!(program = %spec.program.display(), args = ?spec.args, "Running diagnostic command");

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .env_clear()
            .envs(self.child_environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::Spawn {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
            .await
            .map_err(|_| CommandError::TimedOut {
                program: program.clone(),
                timeout: spec.timeout,
            })?
            .map_err(|e| CommandError::Spawn {
                program,
                reason: e.to_string(),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
