//! Identifiers: URL-safe slugs and short random label ids.

use std::fmt;

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::LetxbeError;

const SHORT_ID_LEN: usize = 12;
const SHORT_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A URL-safe unique identifier for a document, an artefact or a task.
///
/// Only ASCII letters, digits and `-` are allowed, and the slug cannot be
/// empty. The check runs on construction and on deserialization.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Creates a new slug, validating its characters.
    pub fn new(slug: impl Into<String>) -> Result<Self, LetxbeError> {
        let slug = slug.into();
        if is_valid_slug(&slug) {
            Ok(Self(slug))
        } else {
            Err(LetxbeError::InvalidSlug { slug })
        }
    }

    /// Returns the slug as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true if `value` is a non-empty string of `[a-zA-Z0-9-]` characters.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl TryFrom<String> for Slug {
    type Error = LetxbeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slug::new(value)
    }
}

impl TryFrom<&str> for Slug {
    type Error = LetxbeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Slug::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slug({})", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates a random 12-character lowercase alphanumeric id.
///
/// Used as the default `lid` of new labels.
pub fn generate_short_unique_id() -> String {
    let mut rng = rand::rng();
    (0..SHORT_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SHORT_ID_ALPHABET.len());
            SHORT_ID_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        for slug in ["abc", "ABC-123", "slug-123", "-", "0"] {
            assert!(Slug::new(slug).is_ok(), "{slug} should be valid");
        }
    }

    #[test]
    fn test_invalid_slugs() {
        for slug in ["", "a b", "a_b", "a/b", "é", "slug.123", "a\n"] {
            let err = Slug::new(slug).expect_err("should fail");
            assert!(matches!(err, LetxbeError::InvalidSlug { .. }));
        }
    }

    #[test]
    fn test_slug_deserialization_validates() {
        let slug: Slug = serde_json::from_str("\"doc-1\"").unwrap();
        assert_eq!(slug.as_str(), "doc-1");
        assert!(serde_json::from_str::<Slug>("\"doc 1\"").is_err());
    }

    #[test]
    fn test_slug_serializes_as_plain_string() {
        let slug = Slug::new("doc-1").unwrap();
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"doc-1\"");
    }

    #[test]
    fn test_generate_short_unique_id() {
        let id = generate_short_unique_id();
        assert_eq!(id.len(), 12);
        assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(id, generate_short_unique_id());
    }
}
