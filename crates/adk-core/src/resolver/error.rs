use thiserror::Error;

/// A requested runtime version or framework is not in the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Runtime version '{version}' not found in compatibility matrix")]
    VersionNotFound {
        version: String,
        /// Every version the matrix knows, deprecated included, newest first.
        known: Vec<String>,
    },

    #[error("Framework '{framework}' not available for runtime {runtime_version}")]
    FrameworkNotFound {
        framework: String,
        runtime_version: String,
        available: Vec<String>,
    },
}

impl LookupError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::VersionNotFound { known, .. } => {
                let mut hints = vec!["Run `adk query runtime --all` to list every version".to_string()];
                if !known.is_empty() {
                    hints.insert(0, format!("Available versions: {}", known.join(", ")));
                }
                hints
            }
            Self::FrameworkNotFound { available, .. } if available.is_empty() => {
                vec!["This runtime version lists no frameworks".to_string()]
            }
            Self::FrameworkNotFound { available, .. } => {
                vec![format!("Available frameworks: {}", available.join(", "))]
            }
        }
    }
}
