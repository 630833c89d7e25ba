//! Errors raised while locating or loading the compatibility matrix.

use std::path::PathBuf;

use thiserror::Error;

/// The matrix source could not be turned into a usable matrix.
///
/// Always fatal to the call that raised it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The matrix file does not exist.
    #[error("Compatibility matrix not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The matrix file exists but could not be read.
    #[error("Failed to read compatibility matrix {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML (or JSON).
    #[error("Failed to parse compatibility matrix {origin}: {reason}")]
    Parse { origin: String, reason: String },

    /// The document parsed but violates the matrix schema.
    #[error("Invalid compatibility matrix at {location}: {reason}")]
    Schema { location: String, reason: String },

    /// No candidate location held a matrix file.
    #[error("No compatibility matrix found (searched: {})", format_paths(searched))]
    NoMatrixFound { searched: Vec<PathBuf> },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigurationError {
    pub(crate) fn schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Hints for fixing the matrix source.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { .. } | Self::NoMatrixFound { .. } => vec![
                "Pass the matrix location with --matrix <PATH>".to_string(),
                "Or set ADK_MATRIX_PATH".to_string(),
                "Or place the file at ./data/compatibility.yaml".to_string(),
            ],
            Self::Read { .. } => vec!["Check that the file is readable by the current user".to_string()],
            Self::Parse { .. } => vec!["Check the YAML syntax of the matrix file".to_string()],
            Self::Schema { location, .. } => vec![
                format!("Fix the value at {location}"),
                "Entry and framework fields are strict; remove misspelled keys".to_string(),
            ],
        }
    }
}
