//! Environment probe service - drives a [`HostProbePort`] through the
//! detection stages and assembles an [`EnvironmentInfo`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{AcceleratorReport, EnvironmentInfo};
use crate::ports::{DetectionError, HostProbePort};

/// Detection stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    DetectOs,
    DetectArch,
    DetectAccelerator,
    DetectFirmware,
    Assemble,
}

impl ProbeStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DetectOs => "os",
            Self::DetectArch => "arch",
            Self::DetectAccelerator => "accelerator",
            Self::DetectFirmware => "firmware",
            Self::Assemble => "assemble",
        }
    }
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service for probing the host environment.
pub struct EnvironmentProbe {
    host: Arc<dyn HostProbePort>,
}

impl EnvironmentProbe {
    pub fn new(host: Arc<dyn HostProbePort>) -> Self {
        Self { host }
    }

    /// Probe the host, failing on the first stage error.
    ///
    /// A firmware lookup failure is not fatal; the field is left empty.
    pub async fn probe(&self) -> Result<EnvironmentInfo, DetectionError> {
        debug!(stage = %ProbeStage::DetectOs, "Probing host");
        let os_name = self.host.detect_os().await?;

        debug!(stage = %ProbeStage::DetectArch, "Probing host");
        let arch = self.host.detect_arch();

        debug!(stage = %ProbeStage::DetectAccelerator, "Probing host");
        let report = self.host.detect_accelerators().await?;

        let firmware = match self.host.detect_firmware().await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "Firmware version unavailable");
                None
            }
        };

        assemble(os_name, arch, report, firmware)
    }

    /// Probe the host, turning stage failures into `"<stage>: <message>"`
    /// warnings.
    ///
    /// Every stage runs even when an earlier one failed, except firmware,
    /// which is skipped when accelerator detection failed. An environment is
    /// returned only when OS and accelerator detection both succeeded.
    pub async fn probe_safe(&self) -> (Option<EnvironmentInfo>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut record = |stage: ProbeStage, err: &DetectionError| {
            debug!(stage = %stage, error = %err, "Probe stage failed");
            warnings.push(format!("{stage}: {err}"));
        };

        let os_name = self
            .host
            .detect_os()
            .await
            .inspect_err(|e| record(ProbeStage::DetectOs, e))
            .ok();
        let arch = self.host.detect_arch();
        let report = self
            .host
            .detect_accelerators()
            .await
            .inspect_err(|e| record(ProbeStage::DetectAccelerator, e))
            .ok();
        // Firmware is read through the same diagnostic tool.
        let firmware = if report.is_some() {
            self.host
                .detect_firmware()
                .await
                .inspect_err(|e| record(ProbeStage::DetectFirmware, e))
                .ok()
        } else {
            None
        };

        let info = match (os_name, report) {
            (Some(os_name), Some(report)) => assemble(os_name, arch, report, firmware)
                .inspect_err(|e| record(ProbeStage::Assemble, e))
                .ok(),
            _ => None,
        };

        (info, warnings)
    }
}

fn assemble(
    os_name: String,
    arch: String,
    report: AcceleratorReport,
    firmware: Option<String>,
) -> Result<EnvironmentInfo, DetectionError> {
    EnvironmentInfo::assemble(os_name, arch, report, firmware).ok_or_else(|| {
        DetectionError::NpuNotDetected {
            reason: "no accelerator devices reported".to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AcceleratorDevice;
    use crate::version::Version;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct MockHost {
        os: Result<String, DetectionError>,
        accelerators: Result<AcceleratorReport, DetectionError>,
        firmware: Result<String, DetectionError>,
    }

    impl MockHost {
        fn healthy() -> Self {
            Self {
                os: Ok("ubuntu22.04".to_string()),
                accelerators: Ok(AcceleratorReport {
                    driver_version: Version::parse("24.1.rc1").unwrap(),
                    devices: (0..8).map(|i| AcceleratorDevice::new(i, "910B")).collect(),
                }),
                firmware: Ok("7.5.0.1.129".to_string()),
            }
        }
    }

    #[async_trait]
    impl HostProbePort for MockHost {
        async fn detect_os(&self) -> Result<String, DetectionError> {
            self.os.clone()
        }

        fn detect_arch(&self) -> String {
            "aarch64".to_string()
        }

        async fn detect_accelerators(&self) -> Result<AcceleratorReport, DetectionError> {
            self.accelerators.clone()
        }

        async fn detect_firmware(&self) -> Result<String, DetectionError> {
            self.firmware.clone()
        }
    }

    fn probe(host: MockHost) -> EnvironmentProbe {
        EnvironmentProbe::new(Arc::new(host))
    }

    fn unsupported_os() -> DetectionError {
        DetectionError::UnsupportedOs {
            id: "centos".to_string(),
            version: "7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_probe_assembles_environment() {
        let info = probe(MockHost::healthy()).probe().await.unwrap();
        assert_eq!(info.os_name, "ubuntu22.04");
        assert_eq!(info.arch, "aarch64");
        assert_eq!(info.accelerator_model, "910B");
        assert_eq!(info.accelerator_count, 8);
        assert_eq!(info.firmware_version.as_deref(), Some("7.5.0.1.129"));
    }

    #[tokio::test]
    async fn test_probe_fails_fast() {
        let host = MockHost {
            os: Err(unsupported_os()),
            ..MockHost::healthy()
        };
        let err = probe(host).probe().await.unwrap_err();
        assert_eq!(err, unsupported_os());
    }

    #[tokio::test]
    async fn test_probe_tolerates_firmware_failure() {
        let host = MockHost {
            firmware: Err(DetectionError::Timeout {
                command: "npu-smi".to_string(),
                timeout: std::time::Duration::from_secs(10),
            }),
            ..MockHost::healthy()
        };
        let info = probe(host).probe().await.unwrap();
        assert!(info.firmware_version.is_none());
    }

    #[tokio::test]
    async fn test_probe_safe_unmapped_os() {
        let host = MockHost {
            os: Err(unsupported_os()),
            ..MockHost::healthy()
        };
        let (info, warnings) = probe(host).probe_safe().await;
        assert!(info.is_none());
        assert_eq!(warnings, vec!["os: Unsupported operating system: centos 7".to_string()]);
    }

    #[tokio::test]
    async fn test_probe_safe_collects_every_failure() {
        let host = MockHost {
            os: Err(unsupported_os()),
            accelerators: Err(DetectionError::DriverNotInstalled {
                command: "npu-smi".to_string(),
                searched: vec![PathBuf::from("/usr/local/Ascend/driver/bin")],
            }),
            ..MockHost::healthy()
        };
        let (info, warnings) = probe(host).probe_safe().await;
        assert!(info.is_none());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[1].starts_with("accelerator: NPU driver not installed"));
    }

    #[tokio::test]
    async fn test_probe_safe_skips_firmware_without_driver() {
        let missing = || DetectionError::DriverNotInstalled {
            command: "npu-smi".to_string(),
            searched: vec![],
        };
        let host = MockHost {
            accelerators: Err(missing()),
            firmware: Err(missing()),
            ..MockHost::healthy()
        };
        let (info, warnings) = probe(host).probe_safe().await;
        assert!(info.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("accelerator: "));
    }

    #[tokio::test]
    async fn test_probe_safe_firmware_only() {
        let host = MockHost {
            firmware: Err(DetectionError::NpuNotDetected {
                reason: "no firmware line".to_string(),
            }),
            ..MockHost::healthy()
        };
        let (info, warnings) = probe(host).probe_safe().await;
        let info = info.unwrap();
        assert!(info.firmware_version.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("firmware: "));
    }

    #[test]
    fn test_probe_empty_report_is_not_detected() {
        let host = MockHost {
            accelerators: Ok(AcceleratorReport {
                driver_version: Version::parse("24.1.rc1").unwrap(),
                devices: vec![],
            }),
            ..MockHost::healthy()
        };
        let err = tokio_test::block_on(probe(host).probe()).unwrap_err();
        assert!(err.is_npu_not_detected());
    }
}
