//! Catalog item identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catalog document.
///
/// Ids are opaque strings assigned by the document store on creation (the
/// demo emulator mints `demo-`-prefixed ids locally). An id is stable for
/// the item's lifetime, unique within its collection, and never reused
/// after deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a store-assigned id string.
    #[must_use]
    pub const fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ItemId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = ItemId::from("abc123");
        assert_eq!(format!("{id}"), "abc123");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ItemId::from("demo-1700000000000-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"demo-1700000000000-1\"");

        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_as_str() {
        let id = ItemId::new("x".to_owned());
        assert_eq!(id.as_str(), "x");
    }
}
