//! Backend selection for the document store.

use allin_core::{Collection, ItemId};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::{Map, Value};

use crate::demo::DemoStore;
use crate::document::Document;
use crate::error::StoreError;
use crate::remote::RemoteStore;

/// The document store backing the catalog, selected once at startup.
///
/// Every caller goes through this enum rather than the concrete clients, so
/// demo deployments and live deployments run the exact same call sites.
#[derive(Clone)]
pub enum CatalogStore {
    Remote(RemoteStore),
    Demo(DemoStore),
}

impl CatalogStore {
    /// Whether this is the in-memory demo variant.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }

    /// Fetch the full contents of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Remote(store) => store.list(collection).await,
            Self::Demo(store) => store.list(collection).await,
        }
    }

    /// Create a document; the store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub async fn create(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        match self {
            Self::Remote(store) => store.create(collection, fields).await,
            Self::Demo(store) => store.create(collection, fields).await,
        }
    }

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id does not exist.
    pub async fn update(
        &self,
        collection: Collection,
        id: &ItemId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Remote(store) => store.update(collection, id, fields).await,
            Self::Demo(store) => store.update(collection, id, fields).await,
        }
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id does not exist.
    pub async fn delete(&self, collection: Collection, id: &ItemId) -> Result<(), StoreError> {
        match self {
            Self::Remote(store) => store.delete(collection, id).await,
            Self::Demo(store) => store.delete(collection, id).await,
        }
    }

    /// Subscribe to full-collection snapshots.
    ///
    /// The first item is the collection's current contents; later items
    /// arrive on every change. The stream ends after yielding its first
    /// error.
    pub fn subscribe(
        &self,
        collection: Collection,
    ) -> BoxStream<'static, Result<Vec<Document>, StoreError>> {
        match self {
            Self::Remote(store) => store.subscribe(collection).boxed(),
            Self::Demo(store) => store.subscribe(collection).boxed(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_demo_dispatch() {
        let store = CatalogStore::Demo(DemoStore::new(Duration::ZERO));
        assert!(store.is_demo());

        let seeded = store.list(Collection::Services).await.unwrap();
        assert_eq!(seeded.len(), 6);

        let mut fields = Map::new();
        fields.insert("title".into(), "Consulting".into());
        let created = store.create(Collection::Services, fields).await.unwrap();
        store
            .delete(Collection::Services, &created.id)
            .await
            .unwrap();
    }
}
