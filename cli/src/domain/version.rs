//! Release version parsing
//!
//! Versions have the form `<base>[+<qualifier>]`. Both parts are opaque
//! tokens; for ordering they are split on `.` into numeric and
//! alphanumeric components.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionFormatError;

/// Human-readable grammar, used in error messages
pub const VERSION_FORMAT: &str = "<base>[+<qualifier>]";

/// One dot-separated piece of a version segment
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Component {
    Numeric(u64),
    Alpha(String),
}

impl Component {
    fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse() {
                return Self::Numeric(n);
            }
        }
        Self::Alpha(s.to_string())
    }
}

/// Either side of the `+` separator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSegment {
    raw: String,
    components: Vec<Component>,
}

impl VersionSegment {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            components: raw.split('.').map(Component::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for VersionSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components
            .cmp(&other.components)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for VersionSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A parsed release version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedVersion {
    base: VersionSegment,
    qualifier: Option<VersionSegment>,
}

impl ParsedVersion {
    /// Parse a version string, allowing at most one `+`
    pub fn parse(version: &str) -> Result<Self, VersionFormatError> {
        let invalid = || VersionFormatError {
            version: version.to_string(),
        };

        let mut parts = version.split('+');
        let base = parts.next().unwrap_or_default();
        let qualifier = parts.next();

        if parts.next().is_some() || base.is_empty() || qualifier == Some("") {
            return Err(invalid());
        }

        Ok(Self {
            base: VersionSegment::new(base),
            qualifier: qualifier.map(VersionSegment::new),
        })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_ref().map(VersionSegment::as_str)
    }
}

impl FromStr for ParsedVersion {
    type Err = VersionFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}+{}", self.base.raw, qualifier.raw),
            None => f.write_str(&self.base.raw),
        }
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_single_plus() {
        let version = ParsedVersion::parse("1+capi").unwrap();
        assert_eq!(version.base(), "1");
        assert_eq!(version.qualifier(), Some("capi"));
        assert_eq!(version.to_string(), "1+capi");
    }

    #[test]
    fn test_parse_without_qualifier() {
        let version: ParsedVersion = "255.3".parse().unwrap();
        assert_eq!(version.base(), "255.3");
        assert_eq!(version.qualifier(), None);
    }

    #[test]
    fn test_parse_rejects_two_plus() {
        let err = ParsedVersion::parse("1+capi+capi").unwrap_err();
        assert_eq!(err.version, "1+capi+capi");
        assert_eq!(
            err.to_string(),
            "Expected version '1+capi+capi' to match version format '<base>[+<qualifier>]'"
        );
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(ParsedVersion::parse("").is_err());
        assert!(ParsedVersion::parse("+capi").is_err());
        assert!(ParsedVersion::parse("1+").is_err());
    }

    #[test]
    fn test_ordering_is_numeric_per_component() {
        let v = |s: &str| ParsedVersion::parse(s).unwrap();
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("1.99"));
        assert!(v("1.0") < v("1.0-rc"));
        assert!(v("1") < v("1+dev.1"));
        assert!(v("1+dev.2") < v("1+dev.10"));
    }
}
