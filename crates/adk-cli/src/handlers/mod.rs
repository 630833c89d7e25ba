//! Command handlers that delegate to the core resolver and probe.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub fn execute(ctx: &CliContext, ...) -> Result<()>`
//!   (`async` when the host is probed)
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call core methods
//!   3. Format output for the terminal
//!
//! An incompatible result is reported on stdout and then returned as
//! [`CliError::Incompatible`](crate::CliError::Incompatible) so the
//! process exits with status 1.

pub mod diagnose;
pub mod query;
pub mod recommend;
pub mod validate;
