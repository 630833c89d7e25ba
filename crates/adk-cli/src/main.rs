//! `adk` binary entry point.

use clap::Parser;

use adk_cli::presentation::format_error;
use adk_cli::{Cli, exit_code_for, init_tracing, run};

#[tokio::main]
async fn main() {
    // Load environment variables before any path or settings lookup
    dotenvy::dotenv().ok();

    // Parse CLI arguments; clap exits with status 2 on misuse
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{}", format_error(&err));
        std::process::exit(exit_code_for(&err));
    }
}
