//! `adk recommend` handler.

use anyhow::Result;
use serde::Serialize;

use adk_core::{CompatibilityQuery, Version};

use crate::bootstrap::CliContext;
use crate::commands::RecommendArgs;
use crate::error::CliError;
use crate::presentation::print_json;

#[derive(Serialize)]
struct Recommendation<'a> {
    driver_version: &'a Version,
    recommended: Option<&'a str>,
    compatible_versions: &'a [String],
}

fn build_query(args: &RecommendArgs) -> Result<CompatibilityQuery, CliError> {
    let driver = Version::parse(&args.driver).map_err(CliError::from_core)?;
    let mut query = CompatibilityQuery::new(driver).including_deprecated(args.all);
    if let Some(os) = &args.os {
        query = query.with_os(os);
    }
    if let Some(model) = &args.accelerator {
        query = query.with_accelerator(model);
    }
    if let Some(arch) = &args.arch {
        query = query.with_arch(arch);
    }
    Ok(query)
}

/// Recommend the newest matching runtime, or list every match with `--all`.
pub fn execute(ctx: &CliContext, args: &RecommendArgs) -> Result<()> {
    let query = build_query(args)?;
    let resolver = ctx.resolver()?;

    let compatible = if args.all {
        resolver.find_compatible(&query)
    } else {
        resolver.get_recommended(&query).into_iter().collect()
    };
    let recommended = resolver.get_recommended(&query);

    if args.json {
        print_json(&Recommendation {
            driver_version: &query.driver_version,
            recommended: recommended.as_deref(),
            compatible_versions: &compatible,
        })?;
    } else if args.all {
        for version in &compatible {
            let deprecated = resolver
                .get_requirements(version)
                .is_ok_and(|entry| entry.deprecated);
            let marker = if deprecated { " (deprecated)" } else { "" };
            println!("{version}{marker}");
        }
    } else if let Some(version) = &recommended {
        println!("{version}");
    }

    if compatible.is_empty() {
        return Err(CliError::Incompatible(format!(
            "no compatible runtime version for driver {}",
            query.driver_version
        ))
        .into());
    }
    Ok(())
}
