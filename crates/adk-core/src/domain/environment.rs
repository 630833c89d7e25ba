//! Facts about the host gathered by the environment probe.

use serde::Serialize;

use crate::version::Version;

/// One row of the diagnostic tool's device table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceleratorDevice {
    pub index: u32,
    pub model: String,
}

impl AcceleratorDevice {
    pub fn new(index: u32, model: impl Into<String>) -> Self {
        Self {
            index,
            model: model.into(),
        }
    }
}

/// What the accelerator detection stage reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceleratorReport {
    pub driver_version: Version,
    pub devices: Vec<AcceleratorDevice>,
}

/// A snapshot of the host, produced fresh per probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentInfo {
    pub driver_version: Version,
    /// Normalized OS token, e.g. `ubuntu22.04`.
    pub os_name: String,
    pub accelerator_model: String,
    /// Always at least 1.
    pub accelerator_count: usize,
    pub arch: String,
    pub firmware_version: Option<String>,
    pub devices: Vec<AcceleratorDevice>,
}

impl EnvironmentInfo {
    /// Describe a host with a single accelerator and no device table.
    pub fn new(
        driver_version: Version,
        os_name: impl Into<String>,
        accelerator_model: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            driver_version,
            os_name: os_name.into(),
            accelerator_model: accelerator_model.into(),
            accelerator_count: 1,
            arch: arch.into(),
            firmware_version: None,
            devices: Vec::new(),
        }
    }

    /// Combine detection results. The model comes from the first device row
    /// and the count is the number of rows; `None` when there are no rows.
    pub fn assemble(
        os_name: impl Into<String>,
        arch: impl Into<String>,
        report: AcceleratorReport,
        firmware_version: Option<String>,
    ) -> Option<Self> {
        let model = report.devices.first()?.model.clone();
        Some(Self {
            driver_version: report.driver_version,
            os_name: os_name.into(),
            accelerator_model: model,
            accelerator_count: report.devices.len(),
            arch: arch.into(),
            firmware_version,
            devices: report.devices,
        })
    }

    /// Override the accelerator count. Zero is raised to 1.
    #[must_use]
    pub fn with_accelerator_count(mut self, count: usize) -> Self {
        self.accelerator_count = count.max(1);
        self
    }

    #[must_use]
    pub fn with_firmware(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(models: &[&str]) -> AcceleratorReport {
        AcceleratorReport {
            driver_version: Version::parse("24.1.rc1").unwrap(),
            devices: models
                .iter()
                .enumerate()
                .map(|(idx, m)| AcceleratorDevice::new(u32::try_from(idx).unwrap(), *m))
                .collect(),
        }
    }

    #[test]
    fn test_assemble_uses_first_row_and_row_count() {
        let info = EnvironmentInfo::assemble(
            "ubuntu22.04",
            "aarch64",
            report(&["910B", "910B", "310P"]),
            Some("7.5.0.1.129".to_string()),
        )
        .unwrap();
        assert_eq!(info.accelerator_model, "910B");
        assert_eq!(info.accelerator_count, 3);
        assert_eq!(info.devices.len(), 3);
        assert_eq!(info.firmware_version.as_deref(), Some("7.5.0.1.129"));
    }

    #[test]
    fn test_assemble_without_rows() {
        assert!(EnvironmentInfo::assemble("ubuntu22.04", "aarch64", report(&[]), None).is_none());
    }

    #[test]
    fn test_count_never_zero() {
        let info = EnvironmentInfo::new(Version::zero(), "ubuntu22.04", "910B", "x86_64")
            .with_accelerator_count(0);
        assert_eq!(info.accelerator_count, 1);
    }
}
