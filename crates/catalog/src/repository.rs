//! Catalog repository.
//!
//! The uniform surface the web app and CLI consume. It validates drafts
//! before any store call, decodes raw documents into typed items, and
//! shields readers from store outages with the built-in fallback catalog.

use allin_core::{Collection, ItemId, Product, ProductDraft, Service, ServiceDraft};
use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{debug, instrument, warn};

use crate::defaults;
use crate::document::Document;
use crate::error::{CatalogError, StorageError};
use crate::storage::{MediaBlob, MediaStorage};
use crate::store::CatalogStore;

/// Façade over the document store and media storage.
///
/// Reads never fail: a store error is logged and answered with the
/// hard-coded fallback catalog, so the public site keeps rendering through
/// an outage. Writes propagate their errors so the admin screens can
/// surface them and leave the form open for retry.
#[derive(Clone)]
pub struct CatalogRepository {
    store: CatalogStore,
    media: MediaStorage,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(store: CatalogStore, media: MediaStorage) -> Self {
        Self { store, media }
    }

    /// Whether the repository runs against the in-memory demo backends.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.store.is_demo()
    }

    // ==================== reads ====================

    /// Current products, newest first; the fallback catalog on store error.
    pub async fn products(&self) -> Vec<Product> {
        match self.store.list(Collection::Products).await {
            Ok(docs) => docs.iter().map(Document::to_product).collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to list products, serving fallback catalog");
                defaults::fallback_products()
            }
        }
    }

    /// Current services; the fallback catalog on store error.
    pub async fn services(&self) -> Vec<Service> {
        match self.store.list(Collection::Services).await {
            Ok(docs) => docs.iter().map(Document::to_service).collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to list services, serving fallback catalog");
                defaults::fallback_services()
            }
        }
    }

    /// Subscribe to product snapshots.
    ///
    /// Each item is the full current product list. If the store reports an
    /// error, the fallback catalog is emitted exactly once and the stream
    /// ends; the subscription does not retry.
    pub fn subscribe_products(&self) -> impl Stream<Item = Vec<Product>> + Send + use<> {
        let store = self.store.clone();
        stream! {
            let mut snapshots = store.subscribe(Collection::Products);
            while let Some(result) = snapshots.next().await {
                match result {
                    Ok(docs) => {
                        let products: Vec<Product> =
                            docs.iter().map(Document::to_product).collect();
                        yield products;
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "products subscription failed, serving fallback catalog"
                        );
                        yield defaults::fallback_products();
                        return;
                    }
                }
            }
        }
    }

    /// Subscribe to service snapshots; same error contract as
    /// [`Self::subscribe_products`].
    pub fn subscribe_services(&self) -> impl Stream<Item = Vec<Service>> + Send + use<> {
        let store = self.store.clone();
        stream! {
            let mut snapshots = store.subscribe(Collection::Services);
            while let Some(result) = snapshots.next().await {
                match result {
                    Ok(docs) => {
                        let services: Vec<Service> =
                            docs.iter().map(Document::to_service).collect();
                        yield services;
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "services subscription failed, serving fallback catalog"
                        );
                        yield defaults::fallback_services();
                        return;
                    }
                }
            }
        }
    }

    // ==================== writes ====================

    /// Create a product from a validated draft.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Validation`] if a required field or the image is
    /// missing, checked before any store call. [`CatalogError::Store`] if
    /// the write itself fails.
    #[instrument(skip(self, draft))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        draft.validate_for_create()?;
        let doc = self
            .store
            .create(Collection::Products, draft.into_fields())
            .await?;
        debug!(id = %doc.id, "product created");
        Ok(doc.to_product())
    }

    /// Merge a draft's fields into an existing product. A draft without an
    /// image leaves the stored image untouched.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Validation`] on missing text fields;
    /// [`CatalogError::Store`] with [`StoreError::NotFound`] if the product
    /// was deleted since the form loaded.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &ItemId,
        draft: ProductDraft,
    ) -> Result<(), CatalogError> {
        draft.validate_for_update()?;
        self.store
            .update(Collection::Products, id, draft.into_fields())
            .await?;
        Ok(())
    }

    /// Delete a product, then try to remove its stored image.
    ///
    /// The image removal is secondary: failures are logged and never fail
    /// the delete, so a dangling object in the bucket is possible.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Store`] if the document delete fails, including
    /// `NotFound` when the id is already gone.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(
        &self,
        id: &ItemId,
        image_url: Option<&str>,
    ) -> Result<(), CatalogError> {
        self.store.delete(Collection::Products, id).await?;

        if let Some(url) = image_url {
            match self.media.delete_by_url(url).await {
                Ok(true) => debug!("product image removed"),
                Ok(false) => debug!("product image not managed by this storage"),
                Err(e) => warn!(error = %e, "failed to remove product image"),
            }
        }
        Ok(())
    }

    /// Create a service from a validated draft.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Validation`] if the title or description is missing;
    /// [`CatalogError::Store`] if the write fails.
    #[instrument(skip(self, draft))]
    pub async fn create_service(&self, draft: ServiceDraft) -> Result<Service, CatalogError> {
        draft.validate()?;
        let doc = self
            .store
            .create(Collection::Services, draft.into_fields())
            .await?;
        debug!(id = %doc.id, "service created");
        Ok(doc.to_service())
    }

    /// Merge a draft's fields into an existing service.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::update_product`], without the image rules.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_service(
        &self,
        id: &ItemId,
        draft: ServiceDraft,
    ) -> Result<(), CatalogError> {
        draft.validate()?;
        self.store
            .update(Collection::Services, id, draft.into_fields())
            .await?;
        Ok(())
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Store`] if the delete fails, including `NotFound`
    /// when the id is already gone.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_service(&self, id: &ItemId) -> Result<(), CatalogError> {
        self.store.delete(Collection::Services, id).await?;
        Ok(())
    }

    // ==================== media ====================

    /// Upload an image and return the public URL to store on the item.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend rejects the upload.
    pub async fn upload_image(
        &self,
        collection: Collection,
        filename: &str,
        content_type: &str,
        bytes: bytes::Bytes,
    ) -> Result<String, StorageError> {
        self.media
            .upload(collection, filename, content_type, bytes)
            .await
    }

    /// Serve a demo-mode blob by key; always `None` against live storage.
    pub async fn media_blob(&self, key: &str) -> Option<MediaBlob> {
        self.media.local_blob(key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use allin_core::ValidationError;
    use secrecy::SecretString;

    use super::*;
    use crate::demo::DemoStore;
    use crate::remote::{RemoteStore, StoreConfig};
    use crate::storage::DemoMedia;

    fn demo_repository() -> CatalogRepository {
        CatalogRepository::new(
            CatalogStore::Demo(DemoStore::new(Duration::ZERO)),
            MediaStorage::Demo(DemoMedia::new(Duration::ZERO)),
        )
    }

    /// A repository whose remote store points at a port nothing listens on,
    /// so every request fails at connect time.
    fn unreachable_repository() -> CatalogRepository {
        let store = RemoteStore::new(&StoreConfig {
            base_url: "http://127.0.0.1:1".to_owned(),
            api_key: SecretString::from("test-key"),
            poll_interval: Duration::from_millis(10),
        })
        .unwrap();
        CatalogRepository::new(
            CatalogStore::Remote(store),
            MediaStorage::Demo(DemoMedia::new(Duration::ZERO)),
        )
    }

    fn mug_draft(image: Option<&str>) -> ProductDraft {
        ProductDraft {
            name: "Test Mug".to_owned(),
            description: "x".to_owned(),
            price: "$10".to_owned(),
            icon: allin_core::IconKey::Package,
            image: image.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_create_appears_in_next_snapshot() {
        let repo = demo_repository();
        let before = repo.products().await.len();

        let created = repo
            .create_product(mug_draft(Some("/media/products/1_mug.png")))
            .await
            .unwrap();
        assert!(created.id.as_str().starts_with("demo-"));

        let after = repo.products().await;
        assert_eq!(after.len(), before + 1);
        assert!(after.iter().any(|p| p.id == created.id));
    }

    #[tokio::test]
    async fn test_create_missing_name_makes_no_store_call() {
        let repo = demo_repository();
        let before = repo.products().await.len();

        let mut draft = mug_draft(Some("/media/products/1_mug.png"));
        draft.name = "   ".to_owned();
        let err = repo.create_product(draft).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::MissingName)
        ));

        assert_eq!(repo.products().await.len(), before);
    }

    #[tokio::test]
    async fn test_create_missing_image_rejected() {
        let repo = demo_repository();
        let err = repo.create_product(mug_draft(None)).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::MissingImage)
        ));
    }

    #[tokio::test]
    async fn test_edit_without_new_image_preserves_image() {
        let repo = demo_repository();
        let created = repo
            .create_product(mug_draft(Some("/media/products/1_mug.png")))
            .await
            .unwrap();

        let mut edit = mug_draft(None);
        edit.price = "$12".to_owned();
        repo.update_product(&created.id, edit).await.unwrap();

        let products = repo.products().await;
        let updated = products.iter().find(|p| p.id == created.id).unwrap();
        assert_eq!(updated.price, "$12");
        assert_eq!(updated.image.as_deref(), Some("/media/products/1_mug.png"));
    }

    #[tokio::test]
    async fn test_delete_twice_fails_second_time() {
        let repo = demo_repository();
        let created = repo
            .create_product(mug_draft(Some("/media/products/1_mug.png")))
            .await
            .unwrap();
        let before = repo.products().await.len();

        repo.delete_product(&created.id, created.image.as_deref())
            .await
            .unwrap();
        assert_eq!(repo.products().await.len(), before - 1);

        let err = repo
            .delete_product(&created.id, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_stored_image_best_effort() {
        let repo = demo_repository();
        let url = repo
            .upload_image(
                Collection::Products,
                "mug.png",
                "image/png",
                bytes::Bytes::from_static(b"img"),
            )
            .await
            .unwrap();
        let created = repo.create_product(mug_draft(Some(&url))).await.unwrap();

        let key = url.strip_prefix("/media/").unwrap().to_owned();
        assert!(repo.media_blob(&key).await.is_some());

        repo.delete_product(&created.id, Some(&url)).await.unwrap();
        assert!(repo.media_blob(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_reads_fall_back_on_store_error() {
        let repo = unreachable_repository();

        let products = repo.products().await;
        assert_eq!(products, defaults::fallback_products());

        let services = repo.services().await;
        assert_eq!(services, defaults::fallback_services());
    }

    #[tokio::test]
    async fn test_subscription_falls_back_exactly_once() {
        let repo = unreachable_repository();

        let mut snapshots = Box::pin(repo.subscribe_products());
        let first = snapshots.next().await.unwrap();
        assert_eq!(first, defaults::fallback_products());

        // The stream ends instead of retrying.
        assert!(snapshots.next().await.is_none());
    }

    #[tokio::test]
    async fn test_demo_subscription_tracks_mutations() {
        let repo = demo_repository();
        let mut snapshots = Box::pin(repo.subscribe_products());

        let initial = snapshots.next().await.unwrap();
        assert_eq!(initial, defaults::fallback_products());

        let created = repo
            .create_product(mug_draft(Some("/media/products/1_mug.png")))
            .await
            .unwrap();

        let next = snapshots.next().await.unwrap();
        assert_eq!(next.len(), initial.len() + 1);
        assert_eq!(next.first().unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_service_crud_round_trip() {
        let repo = demo_repository();
        let draft = ServiceDraft {
            title: "Color Consulting".to_owned(),
            description: "Palette reviews for rebrands".to_owned(),
            icon: allin_core::IconKey::Palette,
        };

        let created = repo.create_service(draft.clone()).await.unwrap();
        assert_eq!(created.title, "Color Consulting");

        let mut edit = draft;
        edit.description = "Palette reviews".to_owned();
        repo.update_service(&created.id, edit).await.unwrap();

        let services = repo.services().await;
        let updated = services.iter().find(|s| s.id == created.id).unwrap();
        assert_eq!(updated.description, "Palette reviews");

        repo.delete_service(&created.id).await.unwrap();
        assert!(
            repo.delete_service(&created.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}
