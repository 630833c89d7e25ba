//! Host probe port for OS, architecture and accelerator detection.
//!
//! Core owns the trait and its error type. Active probing (file reads,
//! running the diagnostic tool) lives in `adk-runtime`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AcceleratorReport;

/// Errors raised while probing the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// The OS metadata file does not exist.
    #[error("OS release file not found: {}", path.display())]
    OsReleaseMissing { path: PathBuf },

    /// The OS metadata file exists but could not be read.
    #[error("Failed to read OS release file {}: {reason}", path.display())]
    OsReleaseUnreadable { path: PathBuf, reason: String },

    /// A required key is absent from the OS metadata file.
    #[error("OS release file {} has no {key} entry", path.display())]
    OsReleaseKeyMissing { path: PathBuf, key: String },

    /// The OS identity has no normalized token.
    #[error("Unsupported operating system: {id} {version}")]
    UnsupportedOs { id: String, version: String },

    /// The diagnostic command is not installed.
    #[error("NPU driver not installed: {command} not found")]
    DriverNotInstalled {
        command: String,
        searched: Vec<PathBuf>,
    },

    /// The diagnostic command ran but reported no usable device data.
    #[error("NPU detection failed: {reason}")]
    NpuNotDetected { reason: String },

    /// The diagnostic command exited unsuccessfully.
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The diagnostic command did not finish in time.
    #[error("{command} timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The driver version reported by the tool does not parse.
    #[error("Invalid driver version '{raw}' reported by the diagnostic tool")]
    InvalidDriverVersion { raw: String },
}

impl DetectionError {
    pub const fn is_driver_not_installed(&self) -> bool {
        matches!(self, Self::DriverNotInstalled { .. })
    }

    pub const fn is_npu_not_detected(&self) -> bool {
        matches!(self, Self::NpuNotDetected { .. })
    }

    /// Hints for fixing the host.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::OsReleaseMissing { .. } | Self::OsReleaseUnreadable { .. } => vec![
                "Check that /etc/os-release exists and is readable".to_string(),
                "Or point ADK_OS_RELEASE at an os-release file".to_string(),
            ],
            Self::OsReleaseKeyMissing { key, .. } => {
                vec![format!("Add a {key} line to the os-release file")]
            }
            Self::UnsupportedOs { .. } => vec![
                "Supported systems: Ubuntu 20.04/22.04/24.04, openEuler 22.03/24.03, Kylin V10"
                    .to_string(),
            ],
            Self::DriverNotInstalled { .. } => vec![
                "Install the Ascend NPU driver".to_string(),
                "Ensure npu-smi is on PATH or under /usr/local/Ascend/driver/bin".to_string(),
            ],
            Self::NpuNotDetected { .. } => vec![
                "Check that the NPU hardware is properly installed".to_string(),
                "Verify that the driver module is loaded (lsmod | grep drv_davinci)".to_string(),
                "Check that device files exist (/dev/davinci*)".to_string(),
            ],
            Self::CommandFailed { .. } | Self::Timeout { .. } => vec![
                "Run npu-smi info manually to inspect the failure".to_string(),
                "Check that the current user may access the NPU devices".to_string(),
            ],
            Self::InvalidDriverVersion { .. } => {
                vec!["Reinstall the NPU driver or report the npu-smi output".to_string()]
            }
        }
    }
}

/// Port for probing the host.
///
/// ```ignore
/// use adk_core::ports::HostProbePort;
///
/// async fn describe(probe: &dyn HostProbePort) -> Result<(), DetectionError> {
///     let os = probe.detect_os().await?;
///     let arch = probe.detect_arch();
///     let report = probe.detect_accelerators().await?;
///     // ...
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HostProbePort: Send + Sync {
    /// Normalized OS token, e.g. `ubuntu22.04`.
    async fn detect_os(&self) -> Result<String, DetectionError>;

    /// Normalized CPU architecture. Never fails.
    fn detect_arch(&self) -> String;

    /// Driver version and device rows from the diagnostic tool.
    async fn detect_accelerators(&self) -> Result<AcceleratorReport, DetectionError>;

    /// Firmware version from the secondary diagnostic query.
    async fn detect_firmware(&self) -> Result<String, DetectionError>;
}
