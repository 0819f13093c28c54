//! Error types for the store and storage boundaries.

use allin_core::{Collection, ItemId, ValidationError};
use thiserror::Error;

/// Errors from the document store boundary.
///
/// Writes surface these to the admin screen as a failure notification with
/// the form left open; reads surface them as a one-time fallback to the
/// built-in catalog. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expect.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The addressed document does not exist (including a second delete of
    /// the same id).
    #[error("not found: {collection}/{id}")]
    NotFound {
        /// Collection that was addressed.
        collection: Collection,
        /// Id that did not resolve.
        id: ItemId,
    },

    /// The store rejected our credentials.
    #[error("permission denied by store (status {status})")]
    PermissionDenied {
        /// HTTP status the store answered with.
        status: u16,
    },

    /// Any other non-success answer from the store.
    #[error("store returned status {status}: {message}")]
    Unexpected {
        /// HTTP status the store answered with.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },
}

impl StoreError {
    /// `true` for the missing-document case.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the object storage boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from the storage service.
    #[error("storage returned status {status}: {message}")]
    Unexpected {
        /// HTTP status the service answered with.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },
}

/// Failures surfaced by [`crate::CatalogRepository`] mutations.
///
/// Validation failures happen before any store call; store failures happen
/// after. Image-deletion failures during a product delete are logged inside
/// the repository and never appear here.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// `true` when the failure is a missing document.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            collection: Collection::Products,
            id: ItemId::from("abc"),
        };
        assert_eq!(err.to_string(), "not found: products/abc");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_catalog_error_wraps_validation() {
        let err = CatalogError::from(ValidationError::MissingName);
        assert_eq!(err.to_string(), "name is required");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_catalog_error_not_found_passthrough() {
        let err = CatalogError::from(StoreError::NotFound {
            collection: Collection::Services,
            id: ItemId::from("gone"),
        });
        assert!(err.is_not_found());
    }
}
