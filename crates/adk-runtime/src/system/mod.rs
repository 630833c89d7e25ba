//! Host probe implementation for adk-runtime.
//!
//! `DefaultHostProbe` implements `HostProbePort` from adk-core by reading
//! the os-release file and running the NPU diagnostic tool.

mod arch;
mod command;
mod env;
mod os_release;
mod smi;

use std::sync::Arc;

use adk_core::{AcceleratorReport, DetectionError, HostProbePort, ProbeSettings};
use async_trait::async_trait;
use tracing::debug;

pub use arch::{current_arch, normalize_arch};
pub use command::{CommandError, CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
pub use env::safe_environment;
pub use os_release::{OsCatalog, OsIdentity, parse_os_release, read_os_identity, reduce_version};
pub use smi::{device_row, driver_version_token, parse_firmware, parse_info};

/// Default implementation of `HostProbePort`.
///
/// # Example
///
/// ```ignore
/// use adk_core::{EnvironmentProbe, ProbeSettings};
/// use adk_runtime::DefaultHostProbe;
///
/// let host = DefaultHostProbe::new(ProbeSettings::from_env()?);
/// let env = EnvironmentProbe::new(Arc::new(host)).probe().await?;
/// ```
pub struct DefaultHostProbe {
    settings: ProbeSettings,
    catalog: OsCatalog,
    runner: Arc<dyn CommandRunner>,
}

impl DefaultHostProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        let runner = Arc::new(TokioCommandRunner::new(&settings));
        Self {
            settings,
            catalog: OsCatalog::default(),
            runner,
        }
    }

    /// Replace the OS mapping table.
    #[must_use]
    pub fn with_catalog(mut self, catalog: OsCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the command runner.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub const fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Locate and run the diagnostic command; non-zero exit is an error.
    async fn run_diagnostic(
        &self,
        args: &[String],
        timeout: std::time::Duration,
    ) -> Result<String, DetectionError> {
        let program = self.runner.locate(&self.settings.command)?;
        let spec = CommandSpec {
            program,
            args: args.to_vec(),
            timeout,
        };
        let output = self.runner.run(&spec).await?;
        if !output.success {
            return Err(DetectionError::CommandFailed {
                command: spec.display_name(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for DefaultHostProbe {
    fn default() -> Self {
        Self::new(ProbeSettings::default())
    }
}

#[async_trait]
impl HostProbePort for DefaultHostProbe {
    async fn detect_os(&self) -> Result<String, DetectionError> {
        let identity = read_os_identity(&self.settings.os_release_path).await?;
        let token = self.catalog.normalize(&identity)?;
        debug!(id = %identity.id, version = %identity.version, token = %token, "Detected OS");
        Ok(token)
    }

    fn detect_arch(&self) -> String {
        current_arch()
    }

    async fn detect_accelerators(&self) -> Result<AcceleratorReport, DetectionError> {
        let stdout = self
            .run_diagnostic(&self.settings.command_args, self.settings.timeout())
            .await?;
        parse_info(&stdout)
    }

    async fn detect_firmware(&self) -> Result<String, DetectionError> {
        let stdout = self
            .run_diagnostic(&self.settings.firmware_args, self.settings.firmware_timeout())
            .await?;
        parse_firmware(&stdout).ok_or_else(|| DetectionError::NpuNotDetected {
            reason: "no firmware version in board information".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::command::MockCommandRunner;
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    const INFO: &str = "\
| npu-smi 24.1.rc1                          Version: 24.1.rc1                               |
| NPU   Name      Health          Power(W)     Temp(C)           Hugepages-Usage(page)      |
| 0       910B    OK              75           42                0    / 0                   |
| 0       0       0000:81:00.0    0            0     / 15171                                |
| 1       910B    OK              72           41                0    / 0                   |
| 0       1       0000:82:00.0    0            0     / 15171                                |
";

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn mock_located() -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_locate()
            .returning(|_| Ok(PathBuf::from("/usr/local/Ascend/driver/bin/npu-smi")));
        runner
    }

    fn probe(runner: MockCommandRunner) -> DefaultHostProbe {
        DefaultHostProbe::default().with_runner(Arc::new(runner))
    }

    #[tokio::test]
    async fn test_detect_accelerators_runs_info() {
        let mut runner = mock_located();
        runner
            .expect_run()
            .withf(|spec| spec.args == ["info"] && spec.timeout == Duration::from_secs(30))
            .times(1)
            .returning(|_| Ok(ok(INFO)));

        let report = probe(runner).detect_accelerators().await.unwrap();
        assert_eq!(report.devices.len(), 2);
        assert_eq!(report.driver_version.as_str(), "24.1.rc1");
    }

    #[tokio::test]
    async fn test_missing_command_is_driver_not_installed() {
        let mut runner = MockCommandRunner::new();
        runner.expect_locate().returning(|program| {
            Err(DetectionError::DriverNotInstalled {
                command: program.to_string(),
                searched: vec![],
            })
        });
        runner.expect_run().never();

        let err = probe(runner).detect_accelerators().await.unwrap_err();
        assert!(err.is_driver_not_installed());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_command_failed() {
        let mut runner = mock_located();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                success: false,
                status: "exit status: 8".to_string(),
                stdout: String::new(),
                stderr: "dcmi module initialize failed\n".to_string(),
            })
        });

        let err = probe(runner).detect_accelerators().await.unwrap_err();
        assert_eq!(
            err,
            DetectionError::CommandFailed {
                command: "npu-smi".to_string(),
                status: "exit status: 8".to_string(),
                stderr: "dcmi module initialize failed".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let mut runner = mock_located();
        runner.expect_run().returning(|spec| {
            Err(CommandError::TimedOut {
                program: spec.display_name(),
                timeout: spec.timeout,
            })
        });

        let err = probe(runner).detect_accelerators().await.unwrap_err();
        assert!(matches!(err, DetectionError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_firmware_uses_board_query() {
        let mut runner = mock_located();
        runner
            .expect_run()
            .withf(|spec| spec.args == ["info", "-t", "board"] && spec.timeout == Duration::from_secs(10))
            .returning(|_| Ok(ok("Firmware Version               : 7.5.0.1.129\n")));

        let firmware = probe(runner).detect_firmware().await.unwrap();
        assert_eq!(firmware, "7.5.0.1.129");
    }

    #[tokio::test]
    async fn test_firmware_without_line() {
        let mut runner = mock_located();
        runner.expect_run().returning(|_| Ok(ok("Board ID : 0x02\n")));
        assert!(probe(runner).detect_firmware().await.is_err());
    }
}
