//! Core services - orchestrate ports and domain logic without knowing
//! concrete implementations.

mod environment_probe;

pub use environment_probe::{EnvironmentProbe, ProbeStage};
