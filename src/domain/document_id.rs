//! Type-safe document identifier.
//!
//! [`DocumentId`] wraps the opaque string key the document store assigns to
//! every record, so that identifiers cannot be confused with display names
//! or other free-form strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a document inside a collection.
///
/// Store-assigned keys are arbitrary strings; identifiers generated by this
/// gateway are UUID v4 strings. Used as the ordering tie-breaker in live
/// queries and as the path parameter of the student endpoints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing store key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the key is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generate_creates_unique_ids() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DocumentId::new("stu-042");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"stu-042\"");
    }

    #[test]
    fn blank_detection() {
        assert!(DocumentId::new("  ").is_blank());
        assert!(!DocumentId::new("a").is_blank());
    }

    #[test]
    fn orders_lexicographically() {
        let mut ids = vec![DocumentId::from("b"), DocumentId::from("a")];
        ids.sort();
        assert_eq!(ids.first().map(DocumentId::as_str), Some("a"));
    }
}
