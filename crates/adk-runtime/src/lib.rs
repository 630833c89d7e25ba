//! Active host probing for adk.
//!
//! Reads OS metadata and runs the NPU diagnostic tool on behalf of the
//! `HostProbePort` defined in adk-core.

#![deny(unused_crate_dependencies)]

pub mod system;

// Re-export the host probe implementation
pub use system::{DefaultHostProbe, OsCatalog, TokioCommandRunner};

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
