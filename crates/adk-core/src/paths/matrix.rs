//! Compatibility matrix location resolution.

use std::env;
use std::path::{Path, PathBuf};

use crate::matrix::ConfigurationError;

pub const MATRIX_PATH_ENV: &str = "ADK_MATRIX_PATH";

/// Matrix location relative to the working directory.
pub const DEFAULT_MATRIX_RELATIVE: &str = "data/compatibility.yaml";

/// How the matrix path was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixPathSource {
    /// Passed by the caller (e.g. `--matrix`).
    Explicit,
    /// From `ADK_MATRIX_PATH` / `.env`.
    EnvVar,
    /// `./data/compatibility.yaml`.
    WorkingDir,
    /// `<config dir>/adk/compatibility.yaml`.
    ConfigDir,
}

/// Resolution result for the matrix path.
#[derive(Debug, Clone)]
pub struct MatrixPathResolution {
    pub path: PathBuf,
    pub source: MatrixPathSource,
}

/// Per-user fallback location, if the platform has a config directory.
pub fn default_config_matrix_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("adk").join("compatibility.yaml"))
}

/// Resolve the matrix path.
///
/// Resolution order:
/// 1. Explicit path provided by caller
/// 2. `ADK_MATRIX_PATH` environment variable
/// 3. `./data/compatibility.yaml`, if it exists
/// 4. `<config dir>/adk/compatibility.yaml`, if it exists
///
/// Explicit and environment paths are returned without checking that they
/// exist, so the loader reports them as not found.
pub fn resolve_matrix_path(explicit: Option<&Path>) -> Result<MatrixPathResolution, ConfigurationError> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(
        explicit,
        env::var(MATRIX_PATH_ENV).ok(),
        &cwd,
        default_config_matrix_path(),
    )
}

fn resolve_from(
    explicit: Option<&Path>,
    env_value: Option<String>,
    cwd: &Path,
    config_path: Option<PathBuf>,
) -> Result<MatrixPathResolution, ConfigurationError> {
    if let Some(path) = explicit {
        return Ok(MatrixPathResolution {
            path: path.to_path_buf(),
            source: MatrixPathSource::Explicit,
        });
    }

    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return Ok(MatrixPathResolution {
            path: PathBuf::from(value.trim()),
            source: MatrixPathSource::EnvVar,
        });
    }

    let mut searched = Vec::new();

    let local = cwd.join(DEFAULT_MATRIX_RELATIVE);
    if local.is_file() {
        return Ok(MatrixPathResolution {
            path: local,
            source: MatrixPathSource::WorkingDir,
        });
    }
    searched.push(local);

    if let Some(config) = config_path {
        if config.is_file() {
            return Ok(MatrixPathResolution {
                path: config,
                source: MatrixPathSource::ConfigDir,
            });
        }
        searched.push(config);
    }

    Err(ConfigurationError::NoMatrixFound { searched })
}
