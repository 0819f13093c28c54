//! In-memory demo-mode store emulator.
//!
//! Selected at startup when no store credentials are configured. Mirrors the
//! remote store's operation surface against process-local state: ordered
//! per-collection document lists, a simulated latency on every call, and a
//! local broadcast that delivers a full snapshot after each mutation. Nothing
//! here touches the network, and a restart resets the state to the built-in
//! fallback catalogs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use allin_core::{Collection, ItemId};
use async_stream::stream;
use futures::Stream;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use crate::defaults;
use crate::document::Document;
use crate::error::StoreError;

/// Snapshots buffered per subscriber before it is considered lagged.
const SNAPSHOT_BUFFER: usize = 16;

/// The demo-mode store.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct DemoStore {
    inner: Arc<DemoStoreInner>,
}

struct DemoStoreInner {
    latency: Duration,
    seq: AtomicU64,
    products: CollectionCell,
    services: CollectionCell,
}

struct CollectionCell {
    docs: Mutex<Vec<Document>>,
    snapshots: broadcast::Sender<Vec<Document>>,
}

impl CollectionCell {
    fn seeded(collection: Collection) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_BUFFER);
        Self {
            docs: Mutex::new(defaults::fallback_documents(collection)),
            snapshots,
        }
    }
}

impl DemoStore {
    /// Create a demo store seeded with the built-in fallback catalogs.
    ///
    /// `latency` is slept before every operation to mimic a network round
    /// trip; pass [`Duration::ZERO`] in tests.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::new(DemoStoreInner {
                latency,
                seq: AtomicU64::new(0),
                products: CollectionCell::seeded(Collection::Products),
                services: CollectionCell::seeded(Collection::Services),
            }),
        }
    }

    fn cell(&self, collection: Collection) -> &CollectionCell {
        match collection {
            Collection::Products => &self.inner.products,
            Collection::Services => &self.inner.services,
        }
    }

    /// Mint a locally unique id. Ids are never reused, even after deletion.
    fn next_id(&self) -> ItemId {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        ItemId::from(format!("demo-{millis}-{seq}"))
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(self.inner.latency).await;
    }

    /// Current contents of a collection.
    ///
    /// # Errors
    ///
    /// Infallible in practice; the signature matches the remote store.
    pub async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.simulate_latency().await;
        Ok(self.cell(collection).docs.lock().await.clone())
    }

    /// Insert a new document at the front of the collection (most recent
    /// first) and broadcast the updated snapshot.
    ///
    /// # Errors
    ///
    /// Infallible in practice; the signature matches the remote store.
    pub async fn create(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        self.simulate_latency().await;

        let doc = Document::new(self.next_id(), fields);
        let cell = self.cell(collection);
        let mut docs = cell.docs.lock().await;
        docs.insert(0, doc.clone());
        let _ = cell.snapshots.send(docs.clone());

        debug!(collection = %collection, id = %doc.id, "demo store created document");
        Ok(doc)
    }

    /// Merge `fields` into an existing document and broadcast the updated
    /// snapshot.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `id` is not in the collection.
    pub async fn update(
        &self,
        collection: Collection,
        id: &ItemId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.simulate_latency().await;

        let cell = self.cell(collection);
        let mut docs = cell.docs.lock().await;
        let Some(doc) = docs.iter_mut().find(|d| &d.id == id) else {
            return Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            });
        };
        doc.merge(fields);
        let _ = cell.snapshots.send(docs.clone());

        debug!(collection = %collection, id = %id, "demo store updated document");
        Ok(())
    }

    /// Remove a document and broadcast the updated snapshot.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if `id` is not in the collection; a second
    /// delete of the same id fails.
    pub async fn delete(&self, collection: Collection, id: &ItemId) -> Result<(), StoreError> {
        self.simulate_latency().await;

        let cell = self.cell(collection);
        let mut docs = cell.docs.lock().await;
        let Some(position) = docs.iter().position(|d| &d.id == id) else {
            return Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            });
        };
        docs.remove(position);
        let _ = cell.snapshots.send(docs.clone());

        debug!(collection = %collection, id = %id, "demo store deleted document");
        Ok(())
    }

    /// Subscribe to full-collection snapshots.
    ///
    /// The current contents are delivered first, then a fresh snapshot after
    /// every mutation. The stream never errors and never ends while the
    /// store is alive; dropping it tears the subscription down.
    pub fn subscribe(
        &self,
        collection: Collection,
    ) -> impl Stream<Item = Result<Vec<Document>, StoreError>> + Send + use<> {
        let store = self.clone();
        stream! {
            // Register before the initial read so no mutation falls between.
            let mut rx = store.cell(collection).snapshots.subscribe();
            let current = store.cell(collection).docs.lock().await.clone();
            yield Ok(current);

            loop {
                match rx.recv().await {
                    Ok(snapshot) => yield Ok(snapshot),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Intermediate snapshots are disposable; deliver the
                        // latest state and continue.
                        debug!(collection = %collection, skipped, "demo subscriber lagged");
                        let current = store.cell(collection).docs.lock().await.clone();
                        yield Ok(current);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;
    use serde_json::json;

    use super::*;

    fn store() -> DemoStore {
        DemoStore::new(Duration::ZERO)
    }

    fn mug_fields() -> Map<String, Value> {
        let Value::Object(fields) = json!({
            "name": "Test Mug",
            "description": "x",
            "price": "$10",
            "icon": "coffee",
            "image": "/media/products/1_mug.png",
        }) else {
            unreachable!()
        };
        fields
    }

    #[tokio::test]
    async fn test_starts_seeded_with_defaults() {
        let store = store();
        let products = store.list(Collection::Products).await.unwrap();
        let services = store.list(Collection::Services).await.unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(services.len(), 6);
    }

    #[tokio::test]
    async fn test_create_prepends_exactly_one() {
        let store = store();
        let before = store.list(Collection::Products).await.unwrap().len();

        let doc = store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();

        let after = store.list(Collection::Products).await.unwrap();
        assert_eq!(after.len(), before + 1);
        // Most-recently-added first.
        assert_eq!(after.first().unwrap().id, doc.id);
        assert!(doc.id.as_str().starts_with("demo-"));
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let store = store();
        let a = store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();
        let b = store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_other_fields() {
        let store = store();
        let doc = store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();

        let mut patch = Map::new();
        patch.insert("price".to_owned(), Value::String("$12".to_owned()));
        store
            .update(Collection::Products, &doc.id, patch)
            .await
            .unwrap();

        let listed = store.list(Collection::Products).await.unwrap();
        let updated = listed.iter().find(|d| d.id == doc.id).unwrap();
        assert_eq!(updated.fields.get("price").unwrap(), "$12");
        assert_eq!(
            updated.fields.get("image").unwrap(),
            "/media/products/1_mug.png"
        );
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let store = store();
        let err = store
            .update(Collection::Products, &ItemId::from("nope"), Map::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice_fails_second_time() {
        let store = store();
        let doc = store
            .create(Collection::Services, mug_fields())
            .await
            .unwrap();
        let before = store.list(Collection::Services).await.unwrap().len();

        store.delete(Collection::Services, &doc.id).await.unwrap();
        let after = store.list(Collection::Services).await.unwrap();
        assert_eq!(after.len(), before - 1);
        assert!(!after.iter().any(|d| d.id == doc.id));

        let err = store
            .delete(Collection::Services, &doc.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_then_changes() {
        let store = store();
        let mut snapshots = Box::pin(store.subscribe(Collection::Products));

        let initial = snapshots.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 8);

        let doc = store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();

        let next = snapshots.next().await.unwrap().unwrap();
        assert_eq!(next.len(), 9);
        assert_eq!(next.first().unwrap().id, doc.id);
    }

    #[tokio::test]
    async fn test_new_instance_resets_to_defaults() {
        let store = store();
        store
            .create(Collection::Products, mug_fields())
            .await
            .unwrap();

        // A fresh process gets a fresh store.
        let reloaded = DemoStore::new(Duration::ZERO);
        let products = reloaded.list(Collection::Products).await.unwrap();
        assert_eq!(products.len(), 8);
        assert!(!products.iter().any(|d| d.id.as_str().starts_with("demo-")));
    }
}
