use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::version::error::VersionParseError;

/// Dotted numeric core, optional pre-release suffix, optional build metadata.
///
/// The suffix either follows a hyphen ("1.0.0-rc.1") or starts with a letter,
/// optionally after "_" or "~" ("1.0.0RC1", "1.1.0beta", "2.0_alpha").
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[vV]?(\d+(?:\.\d+)*)(?:-([0-9A-Za-z.-]+)|[_~]?([A-Za-z][0-9A-Za-z.-]*))?(?:\+[0-9A-Za-z.-]+)?$",
    )
    .unwrap()
});

/// A parsed dotted version such as "1.2", "1.2.3.4" or "2.0.0-beta.1"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedVersion {
    pub components: Vec<u64>,
    pub pre: Option<String>,
}

impl DottedVersion {
    /// Compare two versions.
    ///
    /// Numeric components are compared left to right, a missing trailing
    /// component counts as 0. Pre-release suffixes only break ties when both
    /// sides carry one, in which case they are compared lexically.
    ///
    /// This is deliberately not an `Ord`: "1.0-a" == "1.0" == "1.0-b" while
    /// "1.0-a" < "1.0-b", so the relation is not transitive.
    pub fn compare(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        let component = |v: &Self, i: usize| v.components.get(i).copied().unwrap_or(0);

        let core = (0..len)
            .map(|i| component(self, i).cmp(&component(other, i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal);

        match (core, &self.pre, &other.pre) {
            (Ordering::Equal, Some(a), Some(b)) => a.cmp(b),
            (ord, _, _) => ord,
        }
    }
}

/// Parse a version string into its numeric components and pre-release suffix.
///
/// Examples:
/// - "1" -> [1]
/// - "v1.2.3" -> [1, 2, 3]
/// - "2.0.0-rc.1+build.5" -> [2, 0, 0], pre "rc.1"
/// - "1.0.0RC1" -> [1, 0, 0], pre "RC1"
pub fn parse_version(version: &str) -> Result<DottedVersion, VersionParseError> {
    let captures = VERSION_RE
        .captures(version.trim())
        .ok_or_else(|| VersionParseError(version.to_string()))?;

    let components = captures[1]
        .split('.')
        .map(|part| part.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| VersionParseError(version.to_string()))?;

    Ok(DottedVersion {
        components,
        pre: captures
            .get(2)
            .or_else(|| captures.get(3))
            .map(|m| m.as_str().to_string()),
    })
}

/// Returns true iff `remote` is strictly newer than `current`.
///
/// An unknown current version never counts as outdated, and neither does a
/// pair of versions that cannot both be parsed.
pub fn is_newer(remote: &str, current: Option<&str>) -> bool {
    let Some(current) = current else {
        debug!("No current version known, skipping comparison with {}", remote);
        return false;
    };

    match (parse_version(remote), parse_version(current)) {
        (Ok(remote), Ok(current)) => remote.compare(&current) == Ordering::Greater,
        (Err(e), _) | (_, Err(e)) => {
            debug!("Treating as up to date: {}", e);
            false
        }
    }
}
