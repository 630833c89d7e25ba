//! Compatibility matrix model.
//!
//! A matrix is built once per load, never mutated, and shared behind an
//! `Arc`. Reloading produces a new instance.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::version::Version;

/// Framework pairing for one platform runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameworkConfig {
    /// Framework version, e.g. `2.4.0`.
    pub version: Version,
    /// Paired low-level binding version that must match exactly (e.g. `torch_npu`).
    pub adapter_version: Option<String>,
    /// Supported interpreter versions, e.g. `3.10`.
    pub python_versions: BTreeSet<String>,
    /// Pinned download location for a pre-built package.
    pub package_url: Option<String>,
    /// Integrity checksum for `package_url`, verified by the consumer.
    pub checksum: Option<String>,
    /// Alternative installation command.
    pub install_command: Option<String>,
}

impl FrameworkConfig {
    /// Create a config with no adapter, package or install command.
    pub fn new<I, S>(version: Version, python_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version,
            adapter_version: None,
            python_versions: python_versions.into_iter().map(Into::into).collect(),
            package_url: None,
            checksum: None,
            install_command: None,
        }
    }

    /// Set the paired adapter version.
    #[must_use]
    pub fn with_adapter(mut self, adapter_version: impl Into<String>) -> Self {
        self.adapter_version = Some(adapter_version.into());
        self
    }

    /// Set a pinned package and its checksum.
    #[must_use]
    pub fn with_package(mut self, url: impl Into<String>, checksum: Option<String>) -> Self {
        self.package_url = Some(url.into());
        self.checksum = checksum;
        self
    }

    pub fn supports_python(&self, python_version: &str) -> bool {
        self.python_versions.contains(python_version)
    }

    /// A package URL without a checksum cannot be verified by the consumer.
    pub const fn is_unverifiable_package(&self) -> bool {
        self.package_url.is_some() && self.checksum.is_none()
    }
}

/// One row of the matrix, keyed by platform runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformVersionEntry {
    pub min_driver_version: Version,
    /// Absent means unbounded above.
    pub max_driver_version: Option<Version>,
    pub supported_os: BTreeSet<String>,
    pub supported_accelerator_models: BTreeSet<String>,
    pub supported_arch: BTreeSet<String>,
    pub frameworks: BTreeMap<String, FrameworkConfig>,
    pub deprecated: bool,
    pub toolkit_url: Option<String>,
    pub kernels_url: Option<String>,
    pub release_notes: Option<String>,
}

impl PlatformVersionEntry {
    /// Create an entry with the given driver floor and support sets.
    pub fn new<O, A, R>(min_driver_version: Version, os: O, accelerators: A, arch: R) -> Self
    where
        O: IntoIterator<Item = &'static str>,
        A: IntoIterator<Item = &'static str>,
        R: IntoIterator<Item = &'static str>,
    {
        Self {
            min_driver_version,
            max_driver_version: None,
            supported_os: os.into_iter().map(str::to_string).collect(),
            supported_accelerator_models: accelerators.into_iter().map(str::to_string).collect(),
            supported_arch: arch.into_iter().map(str::to_string).collect(),
            frameworks: BTreeMap::new(),
            deprecated: false,
            toolkit_url: None,
            kernels_url: None,
            release_notes: None,
        }
    }

    /// Set the driver ceiling.
    #[must_use]
    pub fn with_max_driver(mut self, max: Version) -> Self {
        self.max_driver_version = Some(max);
        self
    }

    /// Add a framework pairing.
    #[must_use]
    pub fn with_framework(mut self, name: impl Into<String>, config: FrameworkConfig) -> Self {
        self.frameworks.insert(name.into(), config);
        self
    }

    /// Mark the entry deprecated.
    #[must_use]
    pub const fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn meets_driver_floor(&self, driver: &Version) -> bool {
        driver >= &self.min_driver_version
    }

    pub fn within_driver_ceiling(&self, driver: &Version) -> bool {
        self.max_driver_version.as_ref().is_none_or(|max| driver <= max)
    }

    pub fn supports_os(&self, os_name: &str) -> bool {
        self.supported_os.contains(os_name)
    }

    pub fn supports_accelerator(&self, model: &str) -> bool {
        self.supported_accelerator_models.contains(model)
    }

    pub fn supports_arch(&self, arch: &str) -> bool {
        self.supported_arch.contains(arch)
    }

    pub fn framework_names(&self) -> Vec<String> {
        self.frameworks.keys().cloned().collect()
    }
}

/// The whole compatibility table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityMatrix {
    schema_version: String,
    last_updated: NaiveDate,
    entries: BTreeMap<String, PlatformVersionEntry>,
    #[serde(skip)]
    warnings: Vec<String>,
}

impl CompatibilityMatrix {
    /// Build a matrix from already-validated parts.
    pub fn new(
        schema_version: impl Into<String>,
        last_updated: NaiveDate,
        entries: BTreeMap<String, PlatformVersionEntry>,
    ) -> Self {
        Self {
            schema_version: schema_version.into(),
            last_updated,
            entries,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub const fn last_updated(&self) -> NaiveDate {
        self.last_updated
    }

    pub const fn entries(&self) -> &BTreeMap<String, PlatformVersionEntry> {
        &self.entries
    }

    /// Exact-key lookup.
    pub fn get(&self, runtime_version: &str) -> Option<&PlatformVersionEntry> {
        self.entries.get(runtime_version)
    }

    /// Non-fatal findings recorded while loading (unknown top-level keys,
    /// unverifiable packages).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_driver_window() {
        let entry = PlatformVersionEntry::new(v("23.0.3"), ["ubuntu22.04"], ["910B"], ["x86_64"])
            .with_max_driver(v("25.0.0"));

        assert!(!entry.meets_driver_floor(&v("23.0.2")));
        assert!(entry.meets_driver_floor(&v("23.0.3")));
        assert!(entry.within_driver_ceiling(&v("25.0.0")));
        assert!(!entry.within_driver_ceiling(&v("25.0.1")));
    }

    #[test]
    fn test_unbounded_ceiling() {
        let entry = PlatformVersionEntry::new(v("24.1.rc1"), ["ubuntu22.04"], ["910B"], ["x86_64"]);
        assert!(entry.within_driver_ceiling(&v("99.0.0")));
    }

    #[test]
    fn test_framework_helpers() {
        let config = FrameworkConfig::new(v("2.4.0"), ["3.9", "3.10"])
            .with_adapter("2.4.0.post2")
            .with_package("https://example.invalid/torch_npu.whl", None);

        assert!(config.supports_python("3.10"));
        assert!(!config.supports_python("3.12"));
        assert!(config.is_unverifiable_package());

        let entry = PlatformVersionEntry::new(v("24.1.rc1"), ["ubuntu22.04"], ["910B"], ["x86_64"])
            .with_framework("pytorch", config);
        assert_eq!(entry.framework_names(), vec!["pytorch".to_string()]);
    }

    #[test]
    fn test_matrix_accessors() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "8.0.0".to_string(),
            PlatformVersionEntry::new(v("24.1.rc1"), ["ubuntu22.04"], ["910B"], ["aarch64"]),
        );
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let matrix = CompatibilityMatrix::new("1.0.0", date, entries);

        assert_eq!(matrix.schema_version(), "1.0.0");
        assert_eq!(matrix.last_updated(), date);
        assert_eq!(matrix.len(), 1);
        assert!(matrix.get("8.0.0").is_some());
        assert!(matrix.get("8.0").is_none());
        assert!(matrix.warnings().is_empty());
    }
}
