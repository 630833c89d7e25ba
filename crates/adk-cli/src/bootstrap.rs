//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Logging (tracing-subscriber)
//! - Matrix path resolution and loading (via adk-core)
//! - Host probing (via adk-runtime)
//!
//! Command handlers receive the composed context and delegate work to it.

use std::path::PathBuf;
use std::sync::Arc;

use adk_core::{
    CompatibilityResolver, EnvironmentProbe, MatrixLoader, MatrixPathResolution,
    ProbeSettings, resolve_matrix_path,
};
use adk_runtime::DefaultHostProbe;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Matrix path from `--matrix`.
    pub matrix: Option<PathBuf>,
    /// Raise the default log level to `debug`.
    pub verbose: bool,
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins over the level chosen from `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Composed context for CLI commands.
///
/// The matrix and the host probe are built on first use so that commands
/// which need neither never fail on their configuration.
pub struct CliContext {
    config: CliConfig,
    loader: MatrixLoader,
}

impl CliContext {
    pub fn new(config: CliConfig) -> Self {
        Self {
            config,
            loader: MatrixLoader::new(),
        }
    }

    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Where the matrix would be loaded from.
    pub fn matrix_location(&self) -> Result<MatrixPathResolution, CliError> {
        resolve_matrix_path(self.config.matrix.as_deref()).map_err(CliError::from_core)
    }

    /// Load the matrix and wrap it in a resolver.
    pub fn resolver(&self) -> Result<CompatibilityResolver, CliError> {
        let location = self.matrix_location()?;
        debug!(path = %location.path.display(), source = ?location.source, "Loading compatibility matrix");
        let matrix = self
            .loader
            .load(&location.path)
            .map_err(CliError::from_core)?;
        for warning in matrix.warnings() {
            warn!("{warning}");
        }
        Ok(CompatibilityResolver::new(matrix))
    }

    /// Environment probe backed by the real host.
    pub fn probe(&self) -> Result<EnvironmentProbe, CliError> {
        let settings = ProbeSettings::from_env().map_err(CliError::from_core)?;
        Ok(EnvironmentProbe::new(Arc::new(DefaultHostProbe::new(settings))))
    }
}

/// Bootstrap the CLI context.
pub fn bootstrap(config: CliConfig) -> CliContext {
    CliContext::new(config)
}
