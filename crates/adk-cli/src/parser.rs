//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the NPU compatibility resolver.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Debug, Parser)]
#[command(name = "adk")]
#[command(about = "Resolve NPU driver, OS and runtime compatibility")]
#[command(version)]
pub struct Cli {
    /// Compatibility matrix to load instead of the default lookup
    #[arg(long = "matrix", global = true, value_name = "PATH")]
    pub matrix: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
