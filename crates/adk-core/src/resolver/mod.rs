//! Compatibility resolution over a loaded matrix.
//!
//! All operations are pure reads of an immutable [`CompatibilityMatrix`];
//! a resolver can be shared freely across threads.

mod criteria;
mod error;

use std::sync::Arc;

use tracing::debug;

pub use criteria::{Criterion, criteria};
pub use error::LookupError;

use crate::domain::{
    CompatibilityMatrix, EnvironmentInfo, FrameworkConfig, Incompatibility, PlatformVersionEntry,
    ValidationResult,
};
use crate::version::Version;
use criteria::{Facts, evaluate};

/// Filters for [`CompatibilityResolver::find_compatible`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityQuery {
    pub driver_version: Version,
    pub os_name: Option<String>,
    pub accelerator_model: Option<String>,
    pub arch: Option<String>,
    pub include_deprecated: bool,
}

impl CompatibilityQuery {
    /// Query by driver version only.
    pub const fn new(driver_version: Version) -> Self {
        Self {
            driver_version,
            os_name: None,
            accelerator_model: None,
            arch: None,
            include_deprecated: false,
        }
    }

    #[must_use]
    pub fn with_os(mut self, os_name: impl Into<String>) -> Self {
        self.os_name = Some(os_name.into());
        self
    }

    #[must_use]
    pub fn with_accelerator(mut self, model: impl Into<String>) -> Self {
        self.accelerator_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    #[must_use]
    pub const fn including_deprecated(mut self, include: bool) -> Self {
        self.include_deprecated = include;
        self
    }
}

impl From<&EnvironmentInfo> for CompatibilityQuery {
    fn from(env: &EnvironmentInfo) -> Self {
        Self::new(env.driver_version.clone())
            .with_os(env.os_name.clone())
            .with_accelerator(env.accelerator_model.clone())
            .with_arch(env.arch.clone())
    }
}

/// Answers compatibility questions against one matrix snapshot.
#[derive(Debug, Clone)]
pub struct CompatibilityResolver {
    matrix: Arc<CompatibilityMatrix>,
    /// Matrix keys, newest first.
    ordered: Vec<String>,
}

impl CompatibilityResolver {
    pub fn new(matrix: Arc<CompatibilityMatrix>) -> Self {
        let mut keyed: Vec<(Version, String)> = matrix
            .entries()
            .keys()
            .filter_map(|key| Version::parse(key).ok().map(|v| (v, key.clone())))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        let ordered = keyed.into_iter().map(|(_, key)| key).collect();
        Self { matrix, ordered }
    }

    pub const fn matrix(&self) -> &Arc<CompatibilityMatrix> {
        &self.matrix
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &PlatformVersionEntry)> {
        self.ordered
            .iter()
            .filter_map(|key| self.matrix.get(key).map(|entry| (key.as_str(), entry)))
    }

    /// Requirements for an exact runtime version.
    pub fn get_requirements(&self, runtime_version: &str) -> Result<&PlatformVersionEntry, LookupError> {
        self.matrix
            .get(runtime_version)
            .ok_or_else(|| LookupError::VersionNotFound {
                version: runtime_version.to_string(),
                known: self.list_versions(true),
            })
    }

    /// Runtime versions, newest first.
    pub fn list_versions(&self, include_deprecated: bool) -> Vec<String> {
        self.entries()
            .filter(|(_, entry)| include_deprecated || !entry.deprecated)
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Runtime versions whose every criterion passes for `query`, newest first.
    pub fn find_compatible(&self, query: &CompatibilityQuery) -> Vec<String> {
        let facts = Facts::from(query);
        self.entries()
            .filter(|(_, entry)| query.include_deprecated || !entry.deprecated)
            .filter(|(key, entry)| evaluate(key, entry, &facts).is_empty())
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Framework pairing for a runtime version.
    pub fn get_framework_config(
        &self,
        runtime_version: &str,
        framework: &str,
    ) -> Result<&FrameworkConfig, LookupError> {
        let entry = self.get_requirements(runtime_version)?;
        entry
            .frameworks
            .get(framework)
            .ok_or_else(|| LookupError::FrameworkNotFound {
                framework: framework.to_string(),
                runtime_version: runtime_version.to_string(),
                available: entry.framework_names(),
            })
    }

    /// Check a probed environment against every non-deprecated runtime.
    ///
    /// Each failing criterion of each entry contributes one error. The
    /// result is valid when at least one entry passes.
    pub fn validate_environment(&self, env: &EnvironmentInfo) -> ValidationResult {
        let facts = Facts::from(env);
        let mut result = ValidationResult::default();
        let mut evaluated = 0usize;
        let mut every_entry_capped = true;
        let mut above_every_ceiling = true;

        for (key, entry) in self.entries() {
            let failures = evaluate(key, entry, &facts);

            if entry.deprecated {
                if failures.is_empty() {
                    result.warnings.push(format!(
                        "runtime {key} is deprecated but compatible with this environment"
                    ));
                }
                continue;
            }

            evaluated += 1;
            match &entry.max_driver_version {
                Some(max) if env.driver_version <= *max => above_every_ceiling = false,
                Some(_) => {}
                None => every_entry_capped = false,
            }

            if failures.is_empty() {
                result.compatible_versions.push(key.to_string());
            } else {
                result.errors.extend(failures.iter().map(ToString::to_string));
                result.incompatibilities.extend(failures);
            }
        }

        if evaluated > 0 && every_entry_capped && above_every_ceiling {
            result.warnings.push(format!(
                "driver {} is newer than the maximum supported by every runtime version; the matrix may be outdated",
                env.driver_version
            ));
        }

        result.valid = !result.compatible_versions.is_empty();
        debug!(
            valid = result.valid,
            compatible = result.compatible_versions.len(),
            errors = result.errors.len(),
            "Validated environment"
        );
        result
    }

    /// Newest non-deprecated compatible runtime version.
    pub fn get_recommended(&self, query: &CompatibilityQuery) -> Option<String> {
        let query = query.clone().including_deprecated(false);
        self.find_compatible(&query).into_iter().next()
    }

    /// Failing criteria for a single runtime version; empty means compatible.
    pub fn check_entry(
        &self,
        runtime_version: &str,
        env: &EnvironmentInfo,
    ) -> Result<Vec<Incompatibility>, LookupError> {
        let entry = self.get_requirements(runtime_version)?;
        Ok(evaluate(runtime_version, entry, &Facts::from(env)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatrixLoader;

    const MATRIX: &str = r#"
schema_version: "1.0.0"
last_updated: "2024-12-01"
entries:
  "8.0.0":
    min_driver_version: "24.1.rc1"
    supported_os: [ubuntu22.04, openEuler22.03]
    supported_accelerator_models: ["910B", "910B3"]
    supported_arch: [aarch64, x86_64]
    frameworks:
      pytorch:
        version: "2.4.0"
        adapter_version: "2.4.0.post2"
        python_versions: ["3.9", "3.10"]
  "8.0.0rc3":
    min_driver_version: "24.1.rc1"
    supported_os: [ubuntu22.04]
    supported_accelerator_models: ["910B"]
    supported_arch: [aarch64]
  "7.0.0":
    min_driver_version: "23.0.3"
    max_driver_version: "25.0.0"
    supported_os: [ubuntu20.04, ubuntu22.04]
    supported_accelerator_models: ["910A", "910B"]
    supported_arch: [aarch64, x86_64]
  "6.3.0":
    min_driver_version: "23.0.0"
    max_driver_version: "24.1.0"
    supported_os: [ubuntu20.04, ubuntu22.04]
    supported_accelerator_models: ["910A", "910B"]
    supported_arch: [aarch64]
    deprecated: true
"#;

    fn resolver() -> CompatibilityResolver {
        CompatibilityResolver::new(Arc::new(MatrixLoader::parse_str(MATRIX).unwrap()))
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn env(driver: &str, os: &str, model: &str, arch: &str) -> EnvironmentInfo {
        EnvironmentInfo::new(v(driver), os, model, arch)
    }

    #[test]
    fn test_list_versions_newest_first() {
        let r = resolver();
        assert_eq!(r.list_versions(false), vec!["8.0.0", "8.0.0rc3", "7.0.0"]);
        assert_eq!(r.list_versions(true), vec!["8.0.0", "8.0.0rc3", "7.0.0", "6.3.0"]);
    }

    #[test]
    fn test_driver_floor_inclusive() {
        let r = resolver();
        let found = r.find_compatible(&CompatibilityQuery::new(v("24.1.rc1")));
        assert!(found.contains(&"8.0.0".to_string()));

        let found = r.find_compatible(&CompatibilityQuery::new(v("24.0.0")));
        assert!(!found.contains(&"8.0.0".to_string()));
        assert_eq!(found, vec!["7.0.0"]);
    }

    #[test]
    fn test_driver_ceiling_excludes() {
        let r = resolver();
        let found = r.find_compatible(&CompatibilityQuery::new(v("25.0.1")));
        assert!(!found.contains(&"7.0.0".to_string()));
        assert_eq!(found, vec!["8.0.0", "8.0.0rc3"]);
    }

    #[test]
    fn test_filters_and_deprecated() {
        let r = resolver();
        let query = CompatibilityQuery::new(v("24.0.0"))
            .with_os("ubuntu20.04")
            .with_accelerator("910A")
            .with_arch("aarch64");
        assert_eq!(r.find_compatible(&query), vec!["7.0.0"]);
        assert_eq!(
            r.find_compatible(&query.clone().including_deprecated(true)),
            vec!["7.0.0", "6.3.0"]
        );
        assert!(r.find_compatible(&query.with_arch("riscv64")).is_empty());
    }

    #[test]
    fn test_recommended_prefers_final_release() {
        let r = resolver();
        let query = CompatibilityQuery::new(v("24.1.rc1")).with_os("ubuntu22.04");
        assert_eq!(r.get_recommended(&query).as_deref(), Some("8.0.0"));
    }

    #[test]
    fn test_recommended_ignores_deprecated_even_when_requested() {
        let r = resolver();
        let query = CompatibilityQuery::new(v("23.0.1")).including_deprecated(true);
        assert_eq!(r.find_compatible(&query), vec!["6.3.0"]);
        assert_eq!(r.get_recommended(&query), None);
    }

    #[test]
    fn test_get_requirements_unknown_lists_known() {
        let r = resolver();
        let err = r.get_requirements("9.9.9").unwrap_err();
        match &err {
            LookupError::VersionNotFound { version, known } => {
                assert_eq!(version, "9.9.9");
                assert!(known.contains(&"6.3.0".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.suggestions()[0].contains("8.0.0"));
    }

    #[test]
    fn test_get_requirements_exact_key() {
        let r = resolver();
        assert!(r.get_requirements("8.0.0").is_ok());
        assert!(r.get_requirements("8.0").is_err());
    }

    #[test]
    fn test_framework_lookup() {
        let r = resolver();
        let config = r.get_framework_config("8.0.0", "pytorch").unwrap();
        assert_eq!(config.adapter_version.as_deref(), Some("2.4.0.post2"));

        let err = r.get_framework_config("8.0.0", "tensorflow").unwrap_err();
        assert_eq!(
            err,
            LookupError::FrameworkNotFound {
                framework: "tensorflow".to_string(),
                runtime_version: "8.0.0".to_string(),
                available: vec!["pytorch".to_string()],
            }
        );
        assert!(matches!(
            r.get_framework_config("1.0.0", "pytorch"),
            Err(LookupError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_compatible_environment() {
        let r = resolver();
        let result = r.validate_environment(&env("24.1.rc1", "ubuntu22.04", "910B", "aarch64"));
        assert!(result.valid);
        assert_eq!(result.compatible_versions, vec!["8.0.0", "8.0.0rc3", "7.0.0"]);
        assert_eq!(result.recommended(), Some("8.0.0"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_one_error_per_entry() {
        let r = resolver();
        let result = r.validate_environment(&env("24.1.rc1", "centos7", "910B", "aarch64"));
        assert!(!result.valid);
        assert!(result.compatible_versions.is_empty());
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().all(|e| e.contains("centos7")));
        for (error, runtime) in result.errors.iter().zip(["8.0.0", "8.0.0rc3", "7.0.0"]) {
            assert!(error.contains(runtime), "{error}");
        }
        assert_eq!(result.incompatibilities.len(), 3);
    }

    #[test]
    fn test_validate_reports_driver_floor_message() {
        let r = resolver();
        let result = r.validate_environment(&env("23.0.0", "ubuntu22.04", "910B", "aarch64"));
        assert!(!result.valid);
        assert!(
            result
                .errors
                .contains(&"driver 23.0.0 below minimum 24.1.rc1 for runtime 8.0.0".to_string())
        );
        assert!(result.warnings.iter().any(|w| w.contains("6.3.0")));
    }

    #[test]
    fn test_validate_ceiling_warning_only_when_all_capped() {
        let r = resolver();
        let result = r.validate_environment(&env("30.0.0", "ubuntu22.04", "910B", "aarch64"));
        assert!(result.valid);
        assert!(result.errors[0].contains("above maximum"));
        assert!(!result.warnings.iter().any(|w| w.contains("newer than")));

        let capped = r#"
schema_version: "1.0.0"
last_updated: "2024-12-01"
entries:
  "7.0.0":
    min_driver_version: "23.0.3"
    max_driver_version: "25.0.0"
    supported_os: [ubuntu22.04]
    supported_accelerator_models: ["910B"]
    supported_arch: [aarch64]
"#;
        let r = CompatibilityResolver::new(Arc::new(MatrixLoader::parse_str(capped).unwrap()));
        let result = r.validate_environment(&env("30.0.0", "ubuntu22.04", "910B", "aarch64"));
        assert!(!result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("newer than")));
    }

    #[test]
    fn test_check_entry() {
        let r = resolver();
        let host = env("24.0.0", "ubuntu22.04", "910A", "x86_64");

        let failures = r.check_entry("8.0.0", &host).unwrap();
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0], Incompatibility::DriverBelowMinimum { .. }));
        assert!(matches!(failures[1], Incompatibility::AcceleratorNotSupported { .. }));

        assert!(r.check_entry("7.0.0", &host).unwrap().is_empty());
        assert!(r.check_entry("5.0.0", &host).is_err());
    }

    #[test]
    fn test_query_from_environment() {
        let host = env("24.1.rc1", "ubuntu22.04", "910B", "aarch64");
        let query = CompatibilityQuery::from(&host);
        assert_eq!(query.os_name.as_deref(), Some("ubuntu22.04"));
        assert!(!query.include_deprecated);
        assert_eq!(resolver().find_compatible(&query).len(), 3);
    }
}
