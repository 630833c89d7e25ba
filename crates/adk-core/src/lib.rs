//! Core of the NPU platform-runtime compatibility resolver.
//!
//! Pure domain logic: version ordering, the compatibility matrix and its
//! loader, the resolver, and the host-probe port with the service that
//! drives it. Nothing here runs processes; `adk-runtime` supplies the probe.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod matrix;
pub mod paths;
pub mod ports;
pub mod resolver;
pub mod services;
pub mod settings;
pub mod version;

// Re-export commonly used types for convenience
pub use domain::{
    AcceleratorDevice, AcceleratorReport, CompatibilityMatrix, EnvironmentInfo, FrameworkConfig,
    Incompatibility, PlatformVersionEntry, ValidationResult,
};
pub use error::CoreError;
pub use matrix::{ConfigurationError, MatrixCache, MatrixLoader};
pub use paths::{MatrixPathResolution, MatrixPathSource, resolve_matrix_path};
pub use ports::{DetectionError, HostProbePort};
pub use resolver::{CompatibilityQuery, CompatibilityResolver, Criterion, LookupError};
pub use services::{EnvironmentProbe, ProbeStage};
pub use settings::{ProbeSettings, SettingsError};
pub use version::{Version, VersionError};
