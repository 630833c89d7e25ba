//! Umbrella error for callers that drive several core components.

use thiserror::Error;

use crate::matrix::ConfigurationError;
use crate::ports::DetectionError;
use crate::resolver::LookupError;
use crate::settings::SettingsError;
use crate::version::VersionError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A version string did not parse.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// The matrix could not be located or loaded.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A runtime version or framework is not in the matrix.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Host probing failed.
    #[error(transparent)]
    Detection(#[from] DetectionError),

    /// Probe settings are invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl CoreError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Version(e) => e.suggestions(),
            Self::Configuration(e) => e.suggestions(),
            Self::Lookup(e) => e.suggestions(),
            Self::Detection(e) => e.suggestions(),
            Self::Settings(_) => vec![format!(
                "Check {} and {}",
                crate::settings::OS_RELEASE_ENV,
                crate::settings::PROBE_TIMEOUT_ENV
            )],
        }
    }
}
