//! `adk` command-line adapter: argument parsing, bootstrap, handlers and
//! presentation over `adk-core` and `adk-runtime`.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by the binary target only
use dotenvy as _;
use tokio as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, init_tracing};
pub use commands::{Commands, QueryCommand, RecommendArgs};
pub use error::{CliError, exit_code_for};
pub use parser::Cli;

/// Dispatch a parsed command line to its handler.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig {
        matrix: cli.matrix,
        verbose: cli.verbose,
    });

    match cli.command {
        Commands::Query(QueryCommand::Runtime { version, all, json }) => {
            handlers::query::runtime(&ctx, version.as_deref(), all, json)
        }
        Commands::Query(QueryCommand::Framework {
            runtime,
            framework,
            json,
        }) => handlers::query::framework(&ctx, &runtime, &framework, json),
        Commands::Recommend(args) => handlers::recommend::execute(&ctx, &args),
        Commands::Diagnose { validate, json } => handlers::diagnose::execute(&ctx, validate, json).await,
        Commands::Validate { runtime, json } => handlers::validate::execute(&ctx, &runtime, json).await,
    }
}
