//! The compatibility criteria, evaluated in table order.
//!
//! `find_compatible`, `validate_environment` and `check_entry` all run the
//! same table; an entry passes when no row produces an [`Incompatibility`].

use serde::Serialize;

use crate::domain::{EnvironmentInfo, Incompatibility, PlatformVersionEntry};
use crate::version::Version;

use super::CompatibilityQuery;

/// One row of the criteria table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    DriverFloor,
    DriverCeiling,
    Os,
    Accelerator,
    Arch,
}

/// Host facts a criterion looks at. Absent filters always pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Facts<'a> {
    pub driver: &'a Version,
    pub os_name: Option<&'a str>,
    pub accelerator_model: Option<&'a str>,
    pub arch: Option<&'a str>,
}

impl<'a> From<&'a CompatibilityQuery> for Facts<'a> {
    fn from(query: &'a CompatibilityQuery) -> Self {
        Self {
            driver: &query.driver_version,
            os_name: query.os_name.as_deref(),
            accelerator_model: query.accelerator_model.as_deref(),
            arch: query.arch.as_deref(),
        }
    }
}

impl<'a> From<&'a EnvironmentInfo> for Facts<'a> {
    fn from(env: &'a EnvironmentInfo) -> Self {
        Self {
            driver: &env.driver_version,
            os_name: Some(&env.os_name),
            accelerator_model: Some(&env.accelerator_model),
            arch: Some(&env.arch),
        }
    }
}

type Check = fn(&str, &PlatformVersionEntry, &Facts<'_>) -> Option<Incompatibility>;

const CRITERIA: &[(Criterion, Check)] = &[
    (Criterion::DriverFloor, driver_floor),
    (Criterion::DriverCeiling, driver_ceiling),
    (Criterion::Os, os),
    (Criterion::Accelerator, accelerator),
    (Criterion::Arch, arch),
];

/// Every failing criterion for `entry`, in table order.
pub(crate) fn evaluate(
    runtime_version: &str,
    entry: &PlatformVersionEntry,
    facts: &Facts<'_>,
) -> Vec<Incompatibility> {
    CRITERIA
        .iter()
        .filter_map(|(_, check)| check(runtime_version, entry, facts))
        .collect()
}

/// Names of the criteria, in evaluation order.
pub fn criteria() -> impl Iterator<Item = Criterion> {
    CRITERIA.iter().map(|(criterion, _)| *criterion)
}

fn driver_floor(runtime: &str, entry: &PlatformVersionEntry, facts: &Facts<'_>) -> Option<Incompatibility> {
    (!entry.meets_driver_floor(facts.driver)).then(|| Incompatibility::DriverBelowMinimum {
        runtime_version: runtime.to_string(),
        driver: facts.driver.to_string(),
        minimum: entry.min_driver_version.to_string(),
    })
}

fn driver_ceiling(runtime: &str, entry: &PlatformVersionEntry, facts: &Facts<'_>) -> Option<Incompatibility> {
    let max = entry.max_driver_version.as_ref()?;
    (facts.driver > max).then(|| Incompatibility::DriverAboveMaximum {
        runtime_version: runtime.to_string(),
        driver: facts.driver.to_string(),
        maximum: max.to_string(),
    })
}

fn os(runtime: &str, entry: &PlatformVersionEntry, facts: &Facts<'_>) -> Option<Incompatibility> {
    let os_name = facts.os_name?;
    (!entry.supports_os(os_name)).then(|| Incompatibility::OsNotSupported {
        runtime_version: runtime.to_string(),
        os_name: os_name.to_string(),
        supported: entry.supported_os.iter().cloned().collect(),
    })
}

fn accelerator(runtime: &str, entry: &PlatformVersionEntry, facts: &Facts<'_>) -> Option<Incompatibility> {
    let model = facts.accelerator_model?;
    (!entry.supports_accelerator(model)).then(|| Incompatibility::AcceleratorNotSupported {
        runtime_version: runtime.to_string(),
        model: model.to_string(),
        supported: entry.supported_accelerator_models.iter().cloned().collect(),
    })
}

fn arch(runtime: &str, entry: &PlatformVersionEntry, facts: &Facts<'_>) -> Option<Incompatibility> {
    let arch = facts.arch?;
    (!entry.supports_arch(arch)).then(|| Incompatibility::ArchNotSupported {
        runtime_version: runtime.to_string(),
        arch: arch.to_string(),
        supported: entry.supported_arch.iter().cloned().collect(),
    })
}
