//! Domain types for the compatibility matrix, host environment and validation.
//!
//! These are pure data types with no I/O. The matrix types are built by
//! `crate::matrix` from the external document; environment types are built
//! by a `HostProbePort` implementation.

mod environment;
mod matrix;
mod validation;

pub use environment::{AcceleratorDevice, AcceleratorReport, EnvironmentInfo};
pub use matrix::{CompatibilityMatrix, FrameworkConfig, PlatformVersionEntry};
pub use validation::{Incompatibility, ValidationResult};
