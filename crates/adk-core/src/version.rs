//! Version parsing and ordering for runtime, driver and framework versions.
//!
//! Accepted grammar (keywords are case-insensitive, no surrounding whitespace):
//!
//! ```text
//! RELEASE [SEP? (alpha|beta|rc) N] [SEP? post N]
//! RELEASE = INT ("." INT)*        SEP = "." | "-" | "_"
//! ```
//!
//! `8.0.0`, `8.0.0rc3`, `8.0.0.post1` and driver-style `24.1.rc1` all parse.
//!
//! Ordering: release components are compared numerically (the shorter one is
//! padded with zeros), then a pre-release sorts before its final release
//! (alpha < beta < rc, then by number), then a post-release sorts after it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<release>[0-9]+(?:\.[0-9]+)*)(?:[._-]?(?P<pre>alpha|beta|rc)(?P<pre_num>[0-9]+))?(?:[._-]?post(?P<post>[0-9]+))?$",
    )
    .expect("version pattern is a valid regex")
});

/// Error returned when a string is not a valid version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The input does not match the accepted version grammar.
    #[error("Invalid version format: '{input}'")]
    InvalidFormat { input: String },
}

impl VersionError {
    fn invalid(input: &str) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
        }
    }

    /// Hints for fixing the offending value.
    pub fn suggestions(&self) -> Vec<String> {
        vec![
            "Use MAJOR.MINOR.PATCH with an optional alphaN/betaN/rcN tag and .postN suffix"
                .to_string(),
            "Remove surrounding whitespace and sign characters".to_string(),
        ]
    }
}

/// Pre-release channel. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreReleaseKind {
    Alpha,
    Beta,
    Rc,
}

impl PreReleaseKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "alpha" => Some(Self::Alpha),
            "beta" => Some(Self::Beta),
            "rc" => Some(Self::Rc),
            _ => None,
        }
    }

    /// Canonical lowercase tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
        }
    }
}

/// Pre-release tag such as `rc3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: u64,
}

/// A parsed version.
///
/// The text the version was parsed from is kept so messages can echo what
/// the matrix or the diagnostic tool reported. Equality, ordering and hashing
/// ignore it: `8.0` and `8.0.0` are the same version.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    text: String,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let caps = VERSION_PATTERN
            .captures(input)
            .ok_or_else(|| VersionError::invalid(input))?;

        let release = caps["release"]
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::invalid(input))?;

        let pre = match (caps.name("pre"), caps.name("pre_num")) {
            (Some(tag), Some(num)) => Some(PreRelease {
                kind: PreReleaseKind::from_tag(tag.as_str())
                    .ok_or_else(|| VersionError::invalid(input))?,
                number: num
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::invalid(input))?,
            }),
            _ => None,
        };

        let post = caps
            .name("post")
            .map(|m| m.as_str().parse::<u64>())
            .transpose()
            .map_err(|_| VersionError::invalid(input))?;

        Ok(Self {
            release,
            pre,
            post,
            text: input.to_string(),
        })
    }

    /// The global minimum, `0.0.0`.
    pub fn zero() -> Self {
        Self {
            release: vec![0, 0, 0],
            pre: None,
            post: None,
            text: "0.0.0".to_string(),
        }
    }

    /// Release components, e.g. `[8, 0, 0]`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Pre-release tag, if any.
    pub const fn pre_release(&self) -> Option<PreRelease> {
        self.pre
    }

    /// Post-release number, if any.
    pub const fn post_release(&self) -> Option<u64> {
        self.post
    }

    /// Whether this is an alpha, beta or release candidate.
    pub const fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    /// The text this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(0)
    }

    pub fn minor(&self) -> u64 {
        self.release.get(1).copied().unwrap_or(0)
    }

    /// `MAJOR.MINOR`, e.g. `"8.0"` for `8.0.0rc1`.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major(), self.minor())
    }

    /// Normalized spelling: dotted release, tag glued to it, `.postN` suffix.
    ///
    /// `24.1.RC1` becomes `24.1rc1`.
    pub fn canonical(&self) -> String {
        let mut out = self
            .release
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        if let Some(pre) = self.pre {
            out.push_str(pre.kind.as_str());
            out.push_str(&pre.number.to_string());
        }
        if let Some(post) = self.post {
            out.push_str(".post");
            out.push_str(&post.to_string());
        }
        out
    }

    /// Release components with trailing zeros removed, used for hashing.
    fn significant_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&part| part != 0)
            .map_or(0, |idx| idx + 1);
        &self.release[..end]
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for idx in 0..len {
        let left = a.get(idx).copied().unwrap_or(0);
        let right = b.get(idx).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| match (self.pre, other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            })
            .then_with(|| self.post.cmp(&other.post))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// Whether `input` is a valid version. Never fails.
pub fn is_valid(input: &str) -> bool {
    VERSION_PATTERN.is_match(input) && Version::parse(input).is_ok()
}

/// `version >= minimum`.
pub fn satisfies_minimum(version: &Version, minimum: &Version) -> bool {
    version >= minimum
}

/// Sort version strings, dropping any that do not parse.
pub fn sort_versions<I, S>(versions: I, descending: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed: Vec<Version> = versions
        .into_iter()
        .filter_map(|v| Version::parse(v.as_ref()).ok())
        .collect();
    parsed.sort();
    if descending {
        parsed.reverse();
    }
    parsed.into_iter().map(|v| v.text).collect()
}

/// Highest candidate within the inclusive `[minimum, maximum]` window.
pub fn latest_within<I, S>(
    candidates: I,
    minimum: Option<&Version>,
    maximum: Option<&Version>,
) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|c| Version::parse(c.as_ref()).ok())
        .filter(|v| minimum.is_none_or(|min| v >= min))
        .filter(|v| maximum.is_none_or(|max| v <= max))
        .max()
        .map(|v| v.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_prerelease_final_post_ordering() {
        assert!(v("8.0.0rc3") < v("8.0.0"));
        assert!(v("8.0.0") < v("8.0.0.post1"));
        assert!(v("8.0.0rc3") < v("8.0.0.post1"));
    }

    #[test]
    fn test_prerelease_of_higher_release_beats_lower_final() {
        assert!(v("7.0.0") < v("8.0.0rc1"));
        assert!(v("7.0.0.post9") < v("8.0.0alpha1"));
    }

    #[test]
    fn test_prerelease_channel_order() {
        assert!(v("8.0.0alpha9") < v("8.0.0beta1"));
        assert!(v("8.0.0beta9") < v("8.0.0rc1"));
        assert!(v("8.0.0rc1") < v("8.0.0rc2"));
        assert!(v("8.0.0rc1") < v("8.0.0rc1.post1"));
    }

    #[test]
    fn test_post_release_numbers() {
        assert!(v("2.4.0.post1") < v("2.4.0.post2"));
        assert!(v("2.4.0.post2") < v("2.4.1"));
    }

    #[test]
    fn test_zero_is_global_minimum() {
        let zero = Version::zero();
        assert_eq!(zero, v("0.0.0"));
        for s in ["0.0.0", "0.0.1", "0.0.0.post0", "1.0.0rc1", "24.1.rc1", "0.1"] {
            assert!(zero <= v(s), "{s}");
        }
    }

    #[test]
    fn test_driver_style_versions() {
        let driver = v("24.1.rc1");
        assert_eq!(driver.release(), &[24, 1]);
        assert_eq!(
            driver.pre_release(),
            Some(PreRelease {
                kind: PreReleaseKind::Rc,
                number: 1
            })
        );
        assert!(driver < v("24.1.0"));
        assert!(driver > v("24.0.0"));
        assert!(v("23.0.3") < driver);
    }

    #[test]
    fn test_padding_makes_short_releases_equal() {
        assert_eq!(v("8.0"), v("8.0.0"));
        assert_eq!(v("08.00.0"), v("8.0.0"));
        assert_eq!(compare("8.0", "8.0.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("8.0"));
        assert!(set.contains(&v("8.0.0")));
        assert!(!set.contains(&v("8.0.0rc1")));
    }

    #[test]
    fn test_invalid_versions_rejected() {
        for bad in [
            "not-a-version",
            "",
            " 8.0.0",
            "8.0.0 ",
            "8.0.0\n",
            "-8.0.0",
            "+8.0.0",
            "8..0",
            "8.0.0rc",
            "8.0.0gamma1",
            "v8.0.0",
            "8.0.0.post",
        ] {
            assert!(!is_valid(bad), "{bad:?} should be invalid");
            assert!(matches!(
                Version::parse(bad),
                Err(VersionError::InvalidFormat { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_format_carries_input() {
        let err = Version::parse("not-a-version").unwrap_err();
        assert_eq!(
            err,
            VersionError::InvalidFormat {
                input: "not-a-version".to_string()
            }
        );
        assert!(err.to_string().contains("not-a-version"));
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_huge_component_rejected_not_panicking() {
        assert!(!is_valid("99999999999999999999999.0.0"));
    }

    #[test]
    fn test_tags_case_insensitive() {
        assert_eq!(v("24.1.RC1"), v("24.1rc1"));
        assert_eq!(v("1.0.0-Beta2"), v("1.0.0beta2"));
    }

    #[test]
    fn test_total_order_properties() {
        let samples: Vec<Version> = [
            "0.0.0", "6.3.0", "7.0.0", "7.0.0.post1", "8.0.0alpha1", "8.0.0beta2", "8.0.0rc3",
            "8.0.0", "8.0", "8.0.0.post1", "24.1.rc1", "24.1.0",
        ]
        .iter()
        .map(|s| v(s))
        .collect();

        for a in &samples {
            assert_eq!(a.cmp(a), Ordering::Equal);
            for b in &samples {
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &samples {
                    if a <= b && b <= c {
                        assert!(a <= c, "{a} <= {b} <= {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_canonical_round_trip() {
        for s in [
            "8.0.0",
            "8.0.0rc3",
            "8.0.0.post1",
            "24.1.rc1",
            "1.0.0-BETA2",
            "2.4.0rc1_post3",
            "007.01",
        ] {
            let parsed = v(s);
            let reparsed = v(&parsed.canonical());
            assert_eq!(parsed.cmp(&reparsed), Ordering::Equal, "{s}");
            assert_eq!(v(&parsed.to_string()), parsed, "{s}");
        }
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(v("24.1.rc1").to_string(), "24.1.rc1");
        assert_eq!(v("24.1.rc1").canonical(), "24.1rc1");
    }

    #[test]
    fn test_satisfies_minimum() {
        assert!(satisfies_minimum(&v("24.1.rc1"), &v("24.1.rc1")));
        assert!(satisfies_minimum(&v("24.1.0"), &v("24.1.rc1")));
        assert!(!satisfies_minimum(&v("24.0.0"), &v("24.1.rc1")));
    }

    #[test]
    fn test_sort_versions_skips_invalid() {
        let sorted = sort_versions(["7.0.0", "bogus", "8.0.0rc3", "8.0.0", "6.3.0"], true);
        assert_eq!(sorted, vec!["8.0.0", "8.0.0rc3", "7.0.0", "6.3.0"]);

        let ascending = sort_versions(vec!["8.0.0".to_string(), "6.3.0".to_string()], false);
        assert_eq!(ascending, vec!["6.3.0", "8.0.0"]);
    }

    #[test]
    fn test_latest_within_bounds() {
        let candidates = ["2.1.0", "2.3.1", "2.4.0", "2.5.0rc1"];
        assert_eq!(
            latest_within(candidates, Some(&v("2.2.0")), Some(&v("2.4.0"))),
            Some("2.4.0".to_string())
        );
        assert_eq!(
            latest_within(candidates, None, None),
            Some("2.5.0rc1".to_string())
        );
        assert_eq!(latest_within(candidates, Some(&v("3.0.0")), None), None);
    }

    #[test]
    fn test_major_minor() {
        assert_eq!(v("8.0.0rc1").major_minor(), "8.0");
        assert_eq!(v("24").major_minor(), "24.0");
    }

    #[test]
    fn test_serde_as_string() {
        let parsed: Version = serde_yaml::from_str("\"24.1.rc1\"").unwrap();
        assert_eq!(parsed, v("24.1.rc1"));
        let yaml = serde_yaml::to_string(&parsed).unwrap();
        assert_eq!(serde_yaml::from_str::<Version>(&yaml).unwrap().as_str(), "24.1.rc1");
        assert!(serde_yaml::from_str::<Version>("\"nope\"").is_err());
    }
}
