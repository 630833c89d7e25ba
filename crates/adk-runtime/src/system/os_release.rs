//! `/etc/os-release` parsing and OS normalization.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use adk_core::DetectionError;
use regex::Regex;

static LEADING_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)").expect("version prefix pattern is valid"));

/// Built-in `(id, version) -> token` table. Keys are lowercase.
const BUILTIN_MAPPINGS: &[(&str, &str, &str)] = &[
    ("ubuntu", "20.04", "ubuntu20.04"),
    ("ubuntu", "22.04", "ubuntu22.04"),
    ("ubuntu", "24.04", "ubuntu24.04"),
    ("openeuler", "22.03", "openEuler22.03"),
    ("openeuler", "24.03", "openEuler24.03"),
    ("kylin", "v10", "kylinV10"),
];

/// OS identity as read from the metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsIdentity {
    pub id: String,
    /// `VERSION_ID` reduced to its leading `N[.N]` when numeric.
    pub version: String,
}

/// Parse `KEY=VALUE` lines. Quotes around values are removed; comments and
/// blank lines are skipped.
pub fn parse_os_release(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()))
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// `22.04.3` becomes `22.04`; non-numeric versions such as `V10` are kept.
pub fn reduce_version(version_id: &str) -> String {
    LEADING_VERSION
        .captures(version_id)
        .map_or_else(|| version_id.to_string(), |caps| caps[1].to_string())
}

/// Read the identity from `path`.
pub async fn read_os_identity(path: &Path) -> Result<OsIdentity, DetectionError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            DetectionError::OsReleaseMissing {
                path: path.to_path_buf(),
            }
        } else {
            DetectionError::OsReleaseUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    })?;

    identity_from(&parse_os_release(&text), path)
}

fn identity_from(fields: &HashMap<String, String>, path: &Path) -> Result<OsIdentity, DetectionError> {
    let field = |key: &str| {
        fields
            .get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DetectionError::OsReleaseKeyMissing {
                path: path.to_path_buf(),
                key: key.to_string(),
            })
    };

    Ok(OsIdentity {
        id: field("ID")?.clone(),
        version: reduce_version(field("VERSION_ID")?),
    })
}

/// Maps OS identities onto matrix tokens such as `ubuntu22.04`.
#[derive(Debug, Clone)]
pub struct OsCatalog {
    mappings: HashMap<(String, String), String>,
}

impl Default for OsCatalog {
    fn default() -> Self {
        let mappings = BUILTIN_MAPPINGS
            .iter()
            .map(|(id, version, token)| (((*id).to_string(), (*version).to_string()), (*token).to_string()))
            .collect();
        Self { mappings }
    }
}

impl OsCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping. `id` and `version` are matched
    /// case-insensitively.
    #[must_use]
    pub fn with_mapping(mut self, id: &str, version: &str, token: impl Into<String>) -> Self {
        self.mappings
            .insert((id.to_lowercase(), version.to_lowercase()), token.into());
        self
    }

    /// Token for `identity`, or `UnsupportedOs`.
    pub fn normalize(&self, identity: &OsIdentity) -> Result<String, DetectionError> {
        let key = (identity.id.to_lowercase(), identity.version.to_lowercase());
        self.mappings
            .get(&key)
            .cloned()
            .ok_or_else(|| DetectionError::UnsupportedOs {
                id: identity.id.clone(),
                version: identity.version.clone(),
            })
    }
}
