//! SemVer 2.0.0 version parsing and precedence.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl Identifier {
    fn parse(s: &str) -> Identifier {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = s.parse::<u64>() {
                return Identifier::Numeric(n);
            }
        }
        Identifier::Alpha(s.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Alpha(s) => write!(f, "{}", s),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Alpha(a), Identifier::Alpha(b)) => a.cmp(b),
            // numeric identifiers always have lower precedence than non-numeric ones
            (Identifier::Numeric(_), Identifier::Alpha(_)) => Ordering::Less,
            (Identifier::Alpha(_), Identifier::Numeric(_)) => Ordering::Greater,
        }
    }
}

/// A parsed `major.minor.patch[-prerelease][+build]` version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerelease: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build: String,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: String::new(),
        }
    }

    fn identifiers(&self) -> Vec<Identifier> {
        self.prerelease.iter().map(|s| Identifier::parse(s)).collect()
    }

    /// Parse a SemVer 2.0.0 version string. Returns `None` on malformed input.
    pub fn parse(s: &str) -> Option<Version> {
        let s = s.trim();

        let (core_and_pre, build) = match s.find('+') {
            Some(i) => (&s[..i], s[i + 1..].to_string()),
            None => (s, String::new()),
        };

        let (core, prerelease) = match core_and_pre.find('-') {
            Some(i) => (
                &core_and_pre[..i],
                core_and_pre[i + 1..]
                    .split('.')
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>(),
            ),
            None => (core_and_pre, Vec::new()),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        if parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }

        let major = parts[0].parse().ok()?;
        let minor = parts[1].parse().ok()?;
        let patch = parts[2].parse().ok()?;

        if prerelease.iter().any(|p| p.is_empty()) {
            return None;
        }

        Some(Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }

    /// The next version that is not backwards-compatible under `^`, i.e. the
    /// exclusive upper bound of a caret range over a non-`0.x` version.
    pub(crate) fn next_major(&self) -> Version {
        Version::new(self.major + 1, 0, 0)
    }

    pub(crate) fn next_minor_within_major(&self) -> Version {
        Version::new(self.major, self.minor + 1, 0)
    }

    pub(crate) fn next_patch(&self) -> Version {
        Version::new(self.major, self.minor, self.patch + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
                (true, true) => Ordering::Equal,
                // a version without prerelease outranks one with
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let a = self.identifiers();
                    let b = other.identifiers();
                    for (x, y) in a.iter().zip(b.iter()) {
                        match x.cmp(y) {
                            Ordering::Equal => continue,
                            ord => return ord,
                        }
                    }
                    // trailing shorter prerelease loses (lower precedence)
                    a.len().cmp(&b.len())
                }
            })
        // build metadata is ignored for precedence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_version() {
        let v = Version::parse("5.4.6").unwrap();
        assert_eq!(v, Version::new(5, 4, 6));
    }

    #[test]
    fn parses_prerelease_and_build() {
        let v = Version::parse("1.0.0-alpha.1+build.7").unwrap();
        assert_eq!(v.prerelease, vec!["alpha".to_string(), "1".to_string()]);
        assert_eq!(v.build, "build.7");
    }

    #[test]
    fn rejects_non_triplet() {
        assert!(Version::parse("1.2").is_none());
        assert!(Version::parse("1").is_none());
        assert!(Version::parse("a.b.c").is_none());
    }

    #[test]
    fn no_prerelease_outranks_prerelease() {
        let stable = Version::parse("1.0.0").unwrap();
        let pre = Version::parse("1.0.0-alpha").unwrap();
        assert!(stable > pre);
    }

    #[test]
    fn prerelease_identifiers_compare_left_to_right() {
        let a = Version::parse("1.0.0-alpha").unwrap();
        let b = Version::parse("1.0.0-alpha.1").unwrap();
        let c = Version::parse("1.0.0-alpha.beta").unwrap();
        let d = Version::parse("1.0.0-beta").unwrap();
        let e = Version::parse("1.0.0-beta.2").unwrap();
        let f = Version::parse("1.0.0-beta.11").unwrap();
        let g = Version::parse("1.0.0-rc.1").unwrap();
        let mut ordered = vec![
            g.clone(),
            f.clone(),
            e.clone(),
            d.clone(),
            c.clone(),
            b.clone(),
            a.clone(),
        ];
        ordered.sort();
        assert_eq!(ordered, vec![a, b, c, d, e, f, g]);
    }

    #[test]
    fn numeric_identifiers_compare_numerically_not_lexically() {
        let b2 = Version::parse("1.0.0-beta.2").unwrap();
        let b11 = Version::parse("1.0.0-beta.11").unwrap();
        assert!(b11 > b2); // not true under lexical string comparison
    }

    #[test]
    fn build_metadata_ignored_for_precedence() {
        let a = Version::parse("1.0.0+build1").unwrap();
        let b = Version::parse("1.0.0+build2").unwrap();
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn round_trip_display() {
        let v = Version::parse("1.2.3-rc.1+exp.sha.5114f85").unwrap();
        assert_eq!(v.to_string(), "1.2.3-rc.1+exp.sha.5114f85");
    }
}
