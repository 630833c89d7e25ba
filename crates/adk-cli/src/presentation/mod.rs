//! Shared CLI presentation utilities.
//!
//! Format-only helpers: handlers pick text or JSON, this module renders.

pub mod report;

pub use report::{
    format_entry, format_environment, format_framework, format_incompatibilities,
    format_validation,
};

use serde::Serialize;

use crate::error::CliError;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a failed run for stderr, with hints when the error carries them.
pub fn format_error(err: &anyhow::Error) -> String {
    let mut out = format!("Error: {err}");
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        for hint in cli_err.suggestions() {
            out.push_str("\n  hint: ");
            out.push_str(hint);
        }
    }
    out
}

/// Join a set of tokens for a single display line.
pub fn join<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    items.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Format an optional value for display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<&T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), ToString::to_string)
}
