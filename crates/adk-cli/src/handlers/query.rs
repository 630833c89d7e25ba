//! `adk query` handlers.

use anyhow::Result;
use serde::Serialize;

use adk_core::{FrameworkConfig, PlatformVersionEntry};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_entry, format_framework, print_json};

#[derive(Serialize)]
struct RuntimeView<'a> {
    runtime_version: &'a str,
    #[serde(flatten)]
    entry: &'a PlatformVersionEntry,
}

#[derive(Serialize)]
struct FrameworkView<'a> {
    runtime_version: &'a str,
    framework: &'a str,
    #[serde(flatten)]
    config: &'a FrameworkConfig,
}

/// Show one runtime version, or list the known ones newest first.
pub fn runtime(ctx: &CliContext, version: Option<&str>, all: bool, json: bool) -> Result<()> {
    let resolver = ctx.resolver()?;

    let Some(version) = version else {
        let versions = resolver.list_versions(all);
        if json {
            print_json(&versions)?;
        } else {
            for version in &versions {
                println!("{version}");
            }
        }
        return Ok(());
    };

    let entry = resolver.get_requirements(version).map_err(CliError::from_core)?;
    if json {
        print_json(&RuntimeView {
            runtime_version: version,
            entry,
        })?;
    } else {
        println!("{}", format_entry(version, entry));
    }
    Ok(())
}

/// Show the framework pairing for a runtime version.
pub fn framework(ctx: &CliContext, runtime_version: &str, framework: &str, json: bool) -> Result<()> {
    let resolver = ctx.resolver()?;
    let config = resolver
        .get_framework_config(runtime_version, framework)
        .map_err(CliError::from_core)?;

    if json {
        print_json(&FrameworkView {
            runtime_version,
            framework,
            config,
        })?;
    } else {
        println!("{}", format_framework(runtime_version, framework, config));
    }
    Ok(())
}
