//! Release version parsing and ordering
//!
//! Registry snapshots mix PEP 440 style pre-releases (`1.2.0rc1`,
//! `1.2.0beta2`, `1.2.0.dev3`) with plain `major.minor.patch` strings, so
//! `semver` alone cannot order them. A version here is a numeric base triple
//! plus an optional pre-release tag. Parsing never fails: anything that does
//! not start with `N.N.N` becomes `0.0.0`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(.*)$").expect("valid version regex"));

static PRE_RELEASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[-._]?(alpha|beta|rc|dev)[-._]?(\d+)?$").expect("valid pre-release regex")
});

/// Pre-release channel, ordered by precedence (`Dev` lowest, `Rc` highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseKind {
    Dev,
    Alpha,
    Beta,
    Rc,
}

impl PreReleaseKind {
    /// Precedence weight: rc(3) > beta(2) > alpha(1) > anything else(0)
    pub fn precedence(self) -> u8 {
        match self {
            PreReleaseKind::Dev => 0,
            PreReleaseKind::Alpha => 1,
            PreReleaseKind::Beta => 2,
            PreReleaseKind::Rc => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PreReleaseKind::Dev => "dev",
            PreReleaseKind::Alpha => "alpha",
            PreReleaseKind::Beta => "beta",
            PreReleaseKind::Rc => "rc",
        }
    }

    fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "alpha" => PreReleaseKind::Alpha,
            "beta" => PreReleaseKind::Beta,
            "rc" => PreReleaseKind::Rc,
            _ => PreReleaseKind::Dev,
        }
    }
}

/// Pre-release tag; a missing number counts as 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: u64,
}

/// Parsed release version. `Ord` places newer versions last, so
/// `a > b` means `a` is the more recent release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub base: [u64; 3],
    pub pre_release: Option<PreRelease>,
}

impl Version {
    pub const ZERO: Version = Version {
        base: [0, 0, 0],
        pre_release: None,
    };

    /// Parse a version string, falling back to `0.0.0` when unparsable.
    ///
    /// A trailing suffix that is not a recognised pre-release tag is ignored,
    /// so `1.2.0.post1` orders like `1.2.0`.
    pub fn parse(input: &str) -> Self {
        let Some(caps) = VERSION_RE.captures(input.trim()) else {
            return Self::ZERO;
        };

        let mut base = [0u64; 3];
        for (slot, idx) in base.iter_mut().zip(1..=3) {
            match caps[idx].parse::<u64>() {
                Ok(n) => *slot = n,
                // Components too large for u64 make the whole version unparsable
                Err(_) => return Self::ZERO,
            }
        }

        let pre_release = PRE_RELEASE_RE.captures(&caps[4]).map(|pre| PreRelease {
            kind: PreReleaseKind::from_tag(&pre[1]),
            number: pre
                .get(2)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .unwrap_or(0),
        });

        Self { base, pre_release }
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                // Stable outranks any pre-release of the same base
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.base;
        write!(f, "{major}.{minor}.{patch}")?;
        if let Some(pre) = self.pre_release {
            write!(f, "{}{}", pre.kind.as_str(), pre.number)?;
        }
        Ok(())
    }
}

/// Newest-first comparator over raw version strings.
///
/// Suitable for `sort_by`, which is stable, so equal versions keep their
/// relative order.
pub fn compare_newest_first(a: &str, b: &str) -> Ordering {
    Version::parse(b).cmp(&Version::parse(a))
}
