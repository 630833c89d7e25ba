//! On-disk matrix schema and its conversion into the domain model.
//!
//! The raw structs mirror the document. Entries and frameworks reject
//! unknown keys; the top level only warns about them. Everything that
//! serde cannot check (version syntax, date format, non-empty sets,
//! driver window, duplicate keys) is checked in [`build_matrix`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use super::error::ConfigurationError;
use crate::domain::{CompatibilityMatrix, FrameworkConfig, PlatformVersionEntry};
use crate::version::Version;

static PYTHON_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)*$").expect("python version pattern is valid"));

#[derive(Debug, Deserialize)]
pub(crate) struct RawMatrix {
    #[serde(alias = "version")]
    schema_version: String,
    last_updated: String,
    #[serde(alias = "cann_versions")]
    entries: BTreeMap<String, RawEntry>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    min_driver_version: String,
    #[serde(default)]
    max_driver_version: Option<String>,
    supported_os: Vec<String>,
    #[serde(alias = "supported_npu")]
    supported_accelerator_models: Vec<String>,
    supported_arch: Vec<String>,
    #[serde(default)]
    frameworks: BTreeMap<String, RawFramework>,
    #[serde(default)]
    deprecated: bool,
    #[serde(default, alias = "cann_toolkit_url")]
    toolkit_url: Option<String>,
    #[serde(default)]
    kernels_url: Option<String>,
    #[serde(default)]
    release_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFramework {
    version: String,
    #[serde(default, alias = "torch_npu_version")]
    adapter_version: Option<String>,
    python_versions: Vec<String>,
    #[serde(default, alias = "whl_url")]
    package_url: Option<String>,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    install_command: Option<String>,
}

/// Parse matrix text into the raw schema.
///
/// Syntax errors become [`ConfigurationError::Parse`]; a well-formed
/// document with the wrong shape becomes [`ConfigurationError::Schema`].
pub(crate) fn parse_document(text: &str, origin: &str) -> Result<RawMatrix, ConfigurationError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| ConfigurationError::Parse {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

    serde_yaml::from_value(value).map_err(|e| ConfigurationError::schema(origin, e.to_string()))
}

/// Validate the raw document and build the immutable matrix.
pub(crate) fn build_matrix(raw: RawMatrix) -> Result<CompatibilityMatrix, ConfigurationError> {
    let mut warnings = Vec::new();

    for key in raw.extra.keys() {
        let message = format!("unknown top-level key '{key}' ignored");
        warn!(key = %key, "Unknown top-level key in compatibility matrix");
        warnings.push(message);
    }

    parse_version("schema_version", &raw.schema_version)?;

    let last_updated = NaiveDate::parse_from_str(&raw.last_updated, "%Y-%m-%d").map_err(|e| {
        ConfigurationError::schema(
            "last_updated",
            format!("'{}' is not a YYYY-MM-DD date: {e}", raw.last_updated),
        )
    })?;

    if raw.entries.is_empty() {
        return Err(ConfigurationError::schema("entries", "at least one runtime version is required"));
    }

    let mut seen: Vec<(Version, &str)> = Vec::with_capacity(raw.entries.len());
    for key in raw.entries.keys() {
        let parsed = parse_version(&format!("entries.{key}"), key)?;
        if let Some((_, other)) = seen.iter().find(|(v, _)| *v == parsed) {
            return Err(ConfigurationError::schema(
                format!("entries.{key}"),
                format!("duplicates runtime version '{other}'"),
            ));
        }
        seen.push((parsed, key));
    }

    let mut entries = BTreeMap::new();
    for (key, raw_entry) in raw.entries {
        let entry = build_entry(&key, raw_entry, &mut warnings)?;
        entries.insert(key, entry);
    }

    Ok(CompatibilityMatrix::new(raw.schema_version, last_updated, entries).with_warnings(warnings))
}

fn build_entry(
    key: &str,
    raw: RawEntry,
    warnings: &mut Vec<String>,
) -> Result<PlatformVersionEntry, ConfigurationError> {
    let at = |field: &str| format!("entries.{key}.{field}");

    let min_driver_version = parse_version(&at("min_driver_version"), &raw.min_driver_version)?;
    let max_driver_version = raw
        .max_driver_version
        .as_deref()
        .map(|v| parse_version(&at("max_driver_version"), v))
        .transpose()?;

    if let Some(max) = &max_driver_version
        && min_driver_version > *max
    {
        return Err(ConfigurationError::schema(
            at("max_driver_version"),
            format!("maximum {max} is below minimum {min_driver_version}"),
        ));
    }

    let supported_os = non_empty_set(&at("supported_os"), raw.supported_os)?;
    let supported_accelerator_models = non_empty_set(
        &at("supported_accelerator_models"),
        raw.supported_accelerator_models,
    )?;
    let supported_arch = non_empty_set(&at("supported_arch"), raw.supported_arch)?;

    let mut frameworks = BTreeMap::new();
    for (name, raw_framework) in raw.frameworks {
        let location = at(&format!("frameworks.{name}"));
        let config = build_framework(&location, raw_framework)?;
        if config.is_unverifiable_package() {
            warn!(location = %location, "Framework package has no checksum");
            warnings.push(format!("{location}: package_url has no checksum"));
        }
        frameworks.insert(name, config);
    }

    Ok(PlatformVersionEntry {
        min_driver_version,
        max_driver_version,
        supported_os,
        supported_accelerator_models,
        supported_arch,
        frameworks,
        deprecated: raw.deprecated,
        toolkit_url: raw.toolkit_url,
        kernels_url: raw.kernels_url,
        release_notes: raw.release_notes,
    })
}

fn build_framework(location: &str, raw: RawFramework) -> Result<FrameworkConfig, ConfigurationError> {
    let version = parse_version(&format!("{location}.version"), &raw.version)?;

    let python_location = format!("{location}.python_versions");
    if let Some(bad) = raw.python_versions.iter().find(|p| !PYTHON_VERSION.is_match(p)) {
        return Err(ConfigurationError::schema(
            python_location,
            format!("invalid Python version '{bad}'"),
        ));
    }
    let python_versions = non_empty_set(&python_location, raw.python_versions)?;

    Ok(FrameworkConfig {
        version,
        adapter_version: raw.adapter_version,
        python_versions,
        package_url: raw.package_url,
        checksum: raw.checksum,
        install_command: raw.install_command,
    })
}

fn parse_version(location: &str, value: &str) -> Result<Version, ConfigurationError> {
    Version::parse(value).map_err(|e| ConfigurationError::schema(location, e.to_string()))
}

fn non_empty_set(location: &str, values: Vec<String>) -> Result<BTreeSet<String>, ConfigurationError> {
    if values.is_empty() {
        return Err(ConfigurationError::schema(location, "must list at least one value"));
    }
    Ok(values.into_iter().collect())
}
