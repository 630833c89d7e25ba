//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from CoreError to exit codes and user-facing messages.

use adk_core::CoreError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error (lookup or detection failure).
    #[error("{message}")]
    Core {
        message: String,
        suggestions: Vec<String>,
    },

    /// The environment does not satisfy the requested runtime.
    #[error("{0}")]
    Incompatible(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        suggestions: Vec<String>,
    },
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: Incompatible environment or failed lookup
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 74, 78: see sysexits.h
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core { .. } | Self::Incompatible(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config { .. } => 78, // EX_CONFIG
        }
    }

    /// Convert any core component error.
    pub fn from_core(err: impl Into<CoreError>) -> Self {
        Self::from(err.into())
    }

    /// Actionable hints carried over from the core error.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Core { suggestions, .. } | Self::Config { suggestions, .. } => suggestions,
            Self::Incompatible(_) | Self::Arguments(_) | Self::Io(_) => &[],
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let suggestions = err.suggestions();
        match err {
            CoreError::Version(e) => Self::Arguments(e.to_string()),
            CoreError::Configuration(_) | CoreError::Settings(_) => Self::Config {
                message: err.to_string(),
                suggestions,
            },
            CoreError::Lookup(_) | CoreError::Detection(_) => Self::Core {
                message: err.to_string(),
                suggestions,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for a failed run, defaulting to 1 for errors that are not
/// [`CliError`]s.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
