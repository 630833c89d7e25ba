//! Main commands enum and primary subcommands.
//!
//! This module defines the available commands for the CLI tool.

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Look up matrix entries
    #[command(subcommand)]
    Query(QueryCommand),

    /// Recommend a runtime version for a driver and platform
    Recommend(RecommendArgs),

    /// Probe this host and report its environment
    Diagnose {
        /// Also check the environment against every runtime version
        #[arg(long)]
        validate: bool,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe this host and check it against one runtime version
    Validate {
        /// Runtime version, e.g. 8.0.0
        runtime: String,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

/// Matrix lookups.
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Show one runtime version's requirements, or list runtime versions
    Runtime {
        /// Runtime version to show; lists all versions when omitted
        version: Option<String>,
        /// Include deprecated versions in the listing
        #[arg(long)]
        all: bool,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the framework pairing for a runtime version
    Framework {
        /// Runtime version, e.g. 8.0.0
        runtime: String,
        /// Framework name, e.g. pytorch
        framework: String,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

/// Filters for `adk recommend`.
#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Installed driver version
    #[arg(long)]
    pub driver: String,
    /// OS token, e.g. ubuntu22.04
    #[arg(long)]
    pub os: Option<String>,
    /// Accelerator model, e.g. 910B3
    #[arg(long)]
    pub accelerator: Option<String>,
    /// Machine architecture, e.g. aarch64
    #[arg(long)]
    pub arch: Option<String>,
    /// List every compatible version, including deprecated ones
    #[arg(long)]
    pub all: bool,
    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}
