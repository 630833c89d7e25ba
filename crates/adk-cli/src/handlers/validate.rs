//! `adk validate` handler.

use anyhow::Result;
use serde::Serialize;

use adk_core::{EnvironmentInfo, Incompatibility};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_environment, format_incompatibilities, print_json};

#[derive(Serialize)]
struct EntryCheck<'a> {
    runtime_version: &'a str,
    compatible: bool,
    deprecated: bool,
    environment: &'a EnvironmentInfo,
    incompatibilities: &'a [Incompatibility],
}

/// Probe the host and check it against one runtime version.
pub async fn execute(ctx: &CliContext, runtime_version: &str, json: bool) -> Result<()> {
    let resolver = ctx.resolver()?;
    // Unknown versions fail before the host is touched.
    let deprecated = resolver
        .get_requirements(runtime_version)
        .map_err(CliError::from_core)?
        .deprecated;

    let environment = ctx.probe()?.probe().await.map_err(CliError::from_core)?;
    let failures = resolver
        .check_entry(runtime_version, &environment)
        .map_err(CliError::from_core)?;

    if json {
        print_json(&EntryCheck {
            runtime_version,
            compatible: failures.is_empty(),
            deprecated,
            environment: &environment,
            incompatibilities: &failures,
        })?;
    } else {
        println!("{}", format_environment(&environment));
        println!();
        if failures.is_empty() {
            println!("Runtime {runtime_version} is compatible with this environment");
        } else {
            println!("Runtime {runtime_version} is not compatible with this environment");
            println!("{}", format_incompatibilities(&failures));
        }
        if deprecated {
            println!("warning: runtime {runtime_version} is deprecated");
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::Incompatible(format!(
            "runtime {runtime_version} is not compatible with this environment"
        ))
        .into())
    }
}
