//! Validation outcomes.

use serde::Serialize;
use thiserror::Error;

/// A single failed compatibility criterion for one runtime version.
///
/// The `Display` form is the human-readable error carried in
/// [`ValidationResult::errors`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Incompatibility {
    #[error("driver {driver} below minimum {minimum} for runtime {runtime_version}")]
    DriverBelowMinimum {
        runtime_version: String,
        driver: String,
        minimum: String,
    },

    #[error("driver {driver} above maximum {maximum} for runtime {runtime_version}")]
    DriverAboveMaximum {
        runtime_version: String,
        driver: String,
        maximum: String,
    },

    #[error("OS {os_name} not supported by runtime {runtime_version} (supported: {})", .supported.join(", "))]
    OsNotSupported {
        runtime_version: String,
        os_name: String,
        supported: Vec<String>,
    },

    #[error("accelerator {model} not supported by runtime {runtime_version} (supported: {})", .supported.join(", "))]
    AcceleratorNotSupported {
        runtime_version: String,
        model: String,
        supported: Vec<String>,
    },

    #[error("architecture {arch} not supported by runtime {runtime_version} (supported: {})", .supported.join(", "))]
    ArchNotSupported {
        runtime_version: String,
        arch: String,
        supported: Vec<String>,
    },
}

impl Incompatibility {
    /// The runtime version this record refers to.
    pub fn runtime_version(&self) -> &str {
        match self {
            Self::DriverBelowMinimum { runtime_version, .. }
            | Self::DriverAboveMaximum { runtime_version, .. }
            | Self::OsNotSupported { runtime_version, .. }
            | Self::AcceleratorNotSupported { runtime_version, .. }
            | Self::ArchNotSupported { runtime_version, .. } => runtime_version,
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DriverBelowMinimum { minimum, .. } => vec![
                format!("Upgrade the NPU driver to {minimum} or later"),
                "Or choose an older runtime version".to_string(),
            ],
            Self::DriverAboveMaximum {
                runtime_version, ..
            } => vec![
                "Choose a newer runtime version".to_string(),
                format!("Or downgrade the NPU driver to one supported by {runtime_version}"),
            ],
            Self::OsNotSupported { supported, .. } => {
                vec![format!("Use one of the supported systems: {}", supported.join(", "))]
            }
            Self::AcceleratorNotSupported { .. } => {
                vec!["Choose a runtime version that lists this accelerator model".to_string()]
            }
            Self::ArchNotSupported { supported, .. } => {
                vec![format!("Use one of the supported architectures: {}", supported.join(", "))]
            }
        }
    }
}

/// Result of checking an environment against the whole matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// At least one runtime version passed every criterion.
    pub valid: bool,
    /// Passing runtime versions, newest first.
    pub compatible_versions: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub incompatibilities: Vec<Incompatibility>,
}

impl ValidationResult {
    /// Newest compatible runtime version.
    pub fn recommended(&self) -> Option<&str> {
        self.compatible_versions.first().map(String::as_str)
    }
}
