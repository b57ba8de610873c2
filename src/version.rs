//! # Version Tags
//!
//! This module interprets git tags as semantic versions and computes the next
//! version for a bump.
//!
//! ## Ordering
//!
//! Tags are compared as versions, never as strings: `v1.10.0` is newer than
//! `v1.9.0` even though it sorts lower lexically. Comparison goes through
//! `semver::Version`, i.e. major, then minor, then patch as integers.
//!
//! ## Latest lookup
//!
//! When the working copy is not sitting on a version tag, the baseline for a
//! bump is the highest existing version tag. Which tags are eligible is a
//! [`LatestPolicy`]: all of them, only those sharing the major version of the
//! current tag, or only those of a fixed major version.

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::error::Error;

/// Which component of the version a bump increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Fix,
}

impl FromStr for BumpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "fix" | "patch" => Ok(BumpKind::Fix),
            other => Err(format!(
                "unknown bump kind '{}' (expected major, minor or fix)",
                other
            )),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Fix => "fix",
        };
        f.write_str(s)
    }
}

/// Which version tags are eligible when looking up the latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestPolicy {
    /// Every version tag.
    #[default]
    Any,
    /// Tags sharing the major version of the current tag. Without a current
    /// tag this behaves like `Any`.
    CurrentMajor,
    /// Tags of one fixed major version.
    Major(u64),
}

impl FromStr for LatestPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "any" => Ok(LatestPolicy::Any),
            "current-major" => Ok(LatestPolicy::CurrentMajor),
            _ => s
                .strip_prefix("major:")
                .and_then(|n| n.parse::<u64>().ok())
                .map(LatestPolicy::Major)
                .ok_or_else(|| {
                    format!(
                        "invalid latest scope '{}' (expected any, current-major or major:N)",
                        s
                    )
                }),
        }
    }
}

impl fmt::Display for LatestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestPolicy::Any => f.write_str("any"),
            LatestPolicy::CurrentMajor => f.write_str("current-major"),
            LatestPolicy::Major(n) => write!(f, "major:{}", n),
        }
    }
}

/// Parse a tag string into a semantic version.
///
/// Accepts `v1.2.3`, `1.2.3` and the `refs/tags/` qualified forms.
pub fn parse_version_tag(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix("refs/tags/").unwrap_or(tag);
    let version_str = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(version_str).ok()
}

/// Find the highest version among `tags`, ignoring non-version tags.
pub fn highest_version(tags: &[String]) -> Option<(String, Version)> {
    tags.iter()
        .filter_map(|tag| parse_version_tag(tag).map(|v| (tag.clone(), v)))
        .max_by(|(_, a), (_, b)| a.cmp(b))
}

/// Find the highest eligible version under `policy`. `current` is the
/// version of the tag the working copy sits on, if any.
pub fn latest_version(
    tags: &[String],
    policy: LatestPolicy,
    current: Option<&Version>,
) -> Option<(String, Version)> {
    let major = match (policy, current) {
        (LatestPolicy::Any, _) | (LatestPolicy::CurrentMajor, None) => None,
        (LatestPolicy::CurrentMajor, Some(v)) => Some(v.major),
        (LatestPolicy::Major(n), _) => Some(n),
    };

    tags.iter()
        .filter_map(|tag| parse_version_tag(tag).map(|v| (tag.clone(), v)))
        .filter(|(_, v)| major.is_none_or(|m| v.major == m))
        .max_by(|(_, a), (_, b)| a.cmp(b))
}

/// Compute the version following `current` for a bump of the given kind.
/// Pre-release and build metadata are dropped.
///
/// Fails with `InvalidVersion` when the incremented component would overflow.
pub fn next_version(current: &Version, kind: BumpKind) -> Result<Version, Error> {
    let overflow = || Error::InvalidVersion {
        value: current.to_string(),
        message: format!("{} component cannot be incremented", kind),
    };
    let next = match kind {
        BumpKind::Major => Version::new(current.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
        BumpKind::Minor => Version::new(
            current.major,
            current.minor.checked_add(1).ok_or_else(overflow)?,
            0,
        ),
        BumpKind::Fix => Version::new(
            current.major,
            current.minor,
            current.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    Ok(next)
}

/// Tag name for a version: `v{MAJOR}.{MINOR}.{PATCH}`.
pub fn format_tag(version: &Version) -> String {
    format!("v{}.{}.{}", version.major, version.minor, version.patch)
}
