//! `adk diagnose` handler.

use anyhow::Result;
use serde::Serialize;

use adk_core::{EnvironmentInfo, ValidationResult};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_environment, format_validation, print_json};

#[derive(Serialize)]
struct DiagnoseReport<'a> {
    environment: Option<&'a EnvironmentInfo>,
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<&'a ValidationResult>,
}

/// Probe the host, report what was found and optionally validate it.
pub async fn execute(ctx: &CliContext, validate: bool, json: bool) -> Result<()> {
    // Load the matrix first so a bad matrix is reported before probing.
    let resolver = if validate { Some(ctx.resolver()?) } else { None };
    let probe = ctx.probe()?;

    let (environment, warnings) = probe.probe_safe().await;
    let validation = environment
        .as_ref()
        .zip(resolver.as_ref())
        .map(|(env, resolver)| resolver.validate_environment(env));

    if json {
        print_json(&DiagnoseReport {
            environment: environment.as_ref(),
            warnings: &warnings,
            validation: validation.as_ref(),
        })?;
    } else {
        match &environment {
            Some(env) => println!("{}", format_environment(env)),
            None => println!("Environment detection incomplete"),
        }
        for warning in &warnings {
            println!("warning: {warning}");
        }
        if let Some(result) = &validation {
            println!();
            println!("{}", format_validation(result));
        }
    }

    if environment.is_none() {
        return Err(CliError::Core {
            message: "environment detection failed".to_string(),
            suggestions: warnings,
        }
        .into());
    }
    if validation.is_some_and(|result| !result.valid) {
        return Err(CliError::Incompatible(
            "no runtime version is compatible with this environment".to_string(),
        )
        .into());
    }
    Ok(())
}
