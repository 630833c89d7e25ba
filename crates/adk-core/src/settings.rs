//! Probe settings.
//!
//! Defaults follow the vendor tooling layout. Two environment variables
//! override the most commonly changed values:
//!
//! - `ADK_OS_RELEASE`: path of the os-release file to read
//! - `ADK_PROBE_TIMEOUT_SECS`: timeout for the primary diagnostic call

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";
pub const DEFAULT_DIAGNOSTIC_COMMAND: &str = "npu-smi";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FIRMWARE_TIMEOUT_SECS: u64 = 10;

/// Vendor directories searched for the diagnostic command and appended to
/// its `PATH`.
pub const VENDOR_DRIVER_DIRS: &[&str] = &[
    "/usr/local/Ascend/driver/bin",
    "/usr/local/bin",
    "/opt/Ascend/driver/bin",
];

/// Variables passed through to the diagnostic command.
pub const SAFE_ENV_VARS: &[&str] = &["PATH", "HOME", "USER", "LANG", "LC_ALL", "TERM"];

pub const OS_RELEASE_ENV: &str = "ADK_OS_RELEASE";
pub const PROBE_TIMEOUT_ENV: &str = "ADK_PROBE_TIMEOUT_SECS";

/// Errors from invalid probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Invalid timeout '{value}' for {key}: expected a positive number of seconds")]
    InvalidTimeout { key: String, value: String },

    #[error("Diagnostic command name cannot be empty")]
    EmptyCommand,
}

/// How the host probe locates and runs its inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProbeSettings {
    pub os_release_path: PathBuf,
    /// Diagnostic command name, looked up on `PATH` and `search_dirs`.
    pub command: String,
    pub command_args: Vec<String>,
    pub firmware_args: Vec<String>,
    pub search_dirs: Vec<PathBuf>,
    pub env_allowlist: Vec<String>,
    pub timeout_secs: u64,
    pub firmware_timeout_secs: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            os_release_path: PathBuf::from(DEFAULT_OS_RELEASE_PATH),
            command: DEFAULT_DIAGNOSTIC_COMMAND.to_string(),
            command_args: vec!["info".to_string()],
            firmware_args: vec!["info".to_string(), "-t".to_string(), "board".to_string()],
            search_dirs: VENDOR_DRIVER_DIRS.iter().map(PathBuf::from).collect(),
            env_allowlist: SAFE_ENV_VARS.iter().map(ToString::to_string).collect(),
            timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            firmware_timeout_secs: DEFAULT_FIRMWARE_TIMEOUT_SECS,
        }
    }
}

impl ProbeSettings {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ADK_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(OS_RELEASE_ENV).filter(|p| !p.trim().is_empty()) {
            self.os_release_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(PROBE_TIMEOUT_ENV) {
            self.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| SettingsError::InvalidTimeout {
                    key: PROBE_TIMEOUT_ENV.to_string(),
                    value: raw.clone(),
                })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.command.trim().is_empty() {
            return Err(SettingsError::EmptyCommand);
        }
        for (key, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("firmware_timeout_secs", self.firmware_timeout_secs),
        ] {
            if secs == 0 {
                return Err(SettingsError::InvalidTimeout {
                    key: key.to_string(),
                    value: secs.to_string(),
                });
            }
        }
        Ok(())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn firmware_timeout(&self) -> Duration {
        Duration::from_secs(self.firmware_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.command, "npu-smi");
        assert_eq!(settings.command_args, vec!["info"]);
        assert_eq!(settings.firmware_args, vec!["info", "-t", "board"]);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.firmware_timeout(), Duration::from_secs(10));
        assert!(settings.env_allowlist.contains(&"PATH".to_string()));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let settings = ProbeSettings::default()
            .with_overrides(lookup(&[
                (OS_RELEASE_ENV, "/tmp/os-release"),
                (PROBE_TIMEOUT_ENV, "5"),
            ]))
            .unwrap();
        assert_eq!(settings.os_release_path, PathBuf::from("/tmp/os-release"));
        assert_eq!(settings.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_override() {
        for bad in ["0", "soon", "-3"] {
            let err = ProbeSettings::default()
                .with_overrides(lookup(&[(PROBE_TIMEOUT_ENV, bad)]))
                .unwrap_err();
            assert!(matches!(err, SettingsError::InvalidTimeout { .. }), "{bad}");
        }
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: ProbeSettings = serde_yaml::from_str("timeout_secs: 12\n").unwrap();
        assert_eq!(settings.timeout_secs, 12);
        assert_eq!(settings.command, "npu-smi");
    }

    #[test]
    fn test_empty_command_rejected() {
        let settings = ProbeSettings {
            command: " ".to_string(),
            ..ProbeSettings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::EmptyCommand));
    }
}
