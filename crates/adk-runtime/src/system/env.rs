//! Environment handed to the diagnostic command.
//!
//! The child starts from an empty environment; only allow-listed variables
//! are copied in, and `PATH` is extended with the vendor driver directories.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Build the child environment from `lookup`.
///
/// Vendor directories already on `PATH` are not repeated. When the parent
/// has no `PATH`, the child gets the vendor directories alone.
pub fn safe_environment<F>(
    allowlist: &[String],
    extra_path_dirs: &[PathBuf],
    lookup: F,
) -> Vec<(String, OsString)>
where
    F: Fn(&str) -> Option<OsString>,
{
    let mut vars = Vec::with_capacity(allowlist.len());
    for key in allowlist {
        if key == "PATH" {
            if let Some(path) = extended_path(lookup("PATH"), extra_path_dirs) {
                vars.push((key.clone(), path));
            }
        } else if let Some(value) = lookup(key) {
            vars.push((key.clone(), value));
        }
    }
    vars
}

/// Allow-listed variables from the current process environment.
pub fn process_safe_environment(
    allowlist: &[String],
    extra_path_dirs: &[PathBuf],
) -> Vec<(String, OsString)> {
    safe_environment(allowlist, extra_path_dirs, |key| env::var_os(key))
}

/// Search path made of `PATH` followed by the vendor directories.
pub fn search_path(extra_path_dirs: &[PathBuf]) -> Option<OsString> {
    extended_path(env::var_os("PATH"), extra_path_dirs)
}

fn extended_path(current: Option<OsString>, extra: &[PathBuf]) -> Option<OsString> {
    let mut dirs: Vec<PathBuf> = current
        .as_deref()
        .map(|p| env::split_paths(p).collect())
        .unwrap_or_default();
    for dir in extra {
        if !dirs.contains(dir) {
            dirs.push(dir.clone());
        }
    }
    if dirs.is_empty() {
        return None;
    }
    env::join_paths(dirs).ok()
}
