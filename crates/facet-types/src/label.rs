use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::Ref;
use crate::names::validate_tag_name;

/// Length of a hex-encoded snap hash.
const HASH_HEX_LEN: usize = 64;

/// Returns `true` if `s` is a hex-encoded content hash (a snap).
pub fn is_hash(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// How a version of a component is addressed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VersionLabel {
    /// Human-assigned name mapped to a version ref (e.g. `1.0.0`).
    Tag(String),
    /// Raw content hash of the version.
    Snap(Ref),
}

impl VersionLabel {
    /// Parse a label: 64 hex characters are a snap, anything else must be a
    /// valid tag name.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if is_hash(s) {
            return Ok(Self::Snap(Ref::from_hex(s)?));
        }
        validate_tag_name(s)?;
        Ok(Self::Tag(s.to_string()))
    }

    pub fn is_snap(&self) -> bool {
        matches!(self, Self::Snap(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag),
            Self::Snap(hash) => write!(f, "{hash}"),
        }
    }
}

impl FromStr for VersionLabel {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_hash_is_snap() {
        let r = Ref::from_bytes(b"v1");
        let label = VersionLabel::parse(&r.to_hex()).unwrap();
        assert_eq!(label, VersionLabel::Snap(r));
        assert!(label.is_snap());
    }

    #[test]
    fn plain_name_is_tag() {
        let label: VersionLabel = "1.0.0".parse().unwrap();
        assert_eq!(label, VersionLabel::Tag("1.0.0".into()));
        assert!(label.is_tag());
    }

    #[test]
    fn short_hex_is_a_tag_not_a_snap() {
        assert!(!is_hash("abcdef"));
        assert!(VersionLabel::parse("abcdef").unwrap().is_tag());
    }

    #[test]
    fn display_matches_input() {
        let r = Ref::from_bytes(b"v2");
        assert_eq!(VersionLabel::Snap(r).to_string(), r.to_hex());
        assert_eq!(VersionLabel::Tag("0.1".into()).to_string(), "0.1");
    }

    #[test]
    fn invalid_tag_is_rejected() {
        assert!(VersionLabel::parse("has space").is_err());
    }
}
