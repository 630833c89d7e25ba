//! Port definitions (trait abstractions) for external systems.
//!
//! Ports use only domain types; implementations live in adapter crates.

pub mod host_probe;

pub use host_probe::{DetectionError, HostProbePort};
