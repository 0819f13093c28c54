//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use allin_catalog::{
    CatalogRepository, CatalogStore, DemoMedia, DemoStore, MediaStorage, ObjectStorage,
    RemoteStore, StorageConfig, StorageError, StoreConfig, StoreError,
};
use allin_core::{Product, Service};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use crate::config::SiteConfig;
use crate::services::auth::{AuthError, AuthService, DEMO_AUTH_LATENCY, DemoAuth, IdentityClient};

/// Simulated latency for demo-mode catalog and media operations.
pub const DEMO_STORE_LATENCY: Duration = Duration::from_millis(300);

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("store client error: {0}")]
    Store(#[from] StoreError),
    #[error("storage client error: {0}")]
    Storage(#[from] StorageError),
    #[error("identity client error: {0}")]
    Auth(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Owns the two long-lived catalog
/// subscriptions: each feeds a `watch` cell holding the latest snapshot,
/// which pages read synchronously and the SSE endpoints stream from. The
/// cells start at `None` (nothing emitted yet) and keep their last value
/// if a subscription ends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    repository: CatalogRepository,
    auth: AuthService,
    products: watch::Receiver<Option<Vec<Product>>>,
    services: watch::Receiver<Option<Vec<Service>>>,
}

impl AppState {
    /// Build backends from configuration and start the snapshot pumps.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if a live-mode HTTP client cannot be built.
    pub fn new(config: SiteConfig) -> Result<Self, StateError> {
        let (store, media, auth) = match (&config.store, &config.storage, &config.auth) {
            (Some(store_cfg), Some(storage_cfg), Some(auth_cfg)) => (
                CatalogStore::Remote(RemoteStore::new(&StoreConfig {
                    base_url: store_cfg.api_url.clone(),
                    api_key: store_cfg.api_key.clone(),
                    poll_interval: store_cfg.poll_interval,
                })?),
                MediaStorage::Remote(ObjectStorage::new(&StorageConfig {
                    base_url: storage_cfg.api_url.clone(),
                    public_base_url: storage_cfg.public_url.clone(),
                    api_key: storage_cfg.api_key.clone(),
                })?),
                AuthService::Remote(IdentityClient::new(auth_cfg)?),
            ),
            _ => (
                CatalogStore::Demo(DemoStore::new(DEMO_STORE_LATENCY)),
                MediaStorage::Demo(DemoMedia::new(DEMO_STORE_LATENCY)),
                AuthService::Demo(DemoAuth::new(DEMO_AUTH_LATENCY)),
            ),
        };

        let repository = CatalogRepository::new(store, media);
        let products = spawn_snapshot_pump("products", repository.subscribe_products());
        let services = spawn_snapshot_pump("services", repository.subscribe_services());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                repository,
                auth,
                products,
                services,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog repository.
    #[must_use]
    pub fn repository(&self) -> &CatalogRepository {
        &self.inner.repository
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Whether the process runs against in-memory emulators.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.inner.config.is_demo()
    }

    /// Latest product snapshot, or `None` before the first emission.
    #[must_use]
    pub fn products_snapshot(&self) -> Option<Vec<Product>> {
        self.inner.products.borrow().clone()
    }

    /// Latest service snapshot, or `None` before the first emission.
    #[must_use]
    pub fn services_snapshot(&self) -> Option<Vec<Service>> {
        self.inner.services.borrow().clone()
    }

    /// Watch handle for product snapshots, for the SSE endpoint.
    #[must_use]
    pub fn products_watch(&self) -> watch::Receiver<Option<Vec<Product>>> {
        self.inner.products.clone()
    }

    /// Watch handle for service snapshots, for the SSE endpoint.
    #[must_use]
    pub fn services_watch(&self) -> watch::Receiver<Option<Vec<Service>>> {
        self.inner.services.clone()
    }

    /// Whether both subscriptions have delivered at least one snapshot.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.inner.products.borrow().is_some() && self.inner.services.borrow().is_some()
    }

    /// Products for page rendering: the latest snapshot, or a direct
    /// repository read while the subscription has not emitted yet.
    pub async fn current_products(&self) -> Vec<Product> {
        match self.products_snapshot() {
            Some(products) => products,
            None => self.inner.repository.products().await,
        }
    }

    /// Services for page rendering; same contract as
    /// [`Self::current_products`].
    pub async fn current_services(&self) -> Vec<Service> {
        match self.services_snapshot() {
            Some(services) => services,
            None => self.inner.repository.services().await,
        }
    }
}

/// Drive a snapshot stream into a `watch` cell from a background task.
///
/// The task ends when the stream does (a fallback emission after a store
/// error) or when state is dropped; the cell keeps the last snapshot either
/// way.
fn spawn_snapshot_pump<T>(
    name: &'static str,
    stream: impl Stream<Item = Vec<T>> + Send + 'static,
) -> watch::Receiver<Option<Vec<T>>>
where
    T: Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(None);
    tokio::spawn(async move {
        futures::pin_mut!(stream);
        while let Some(snapshot) = stream.next().await {
            if tx.send(Some(snapshot)).is_err() {
                // All receivers dropped.
                return;
            }
        }
        debug!(collection = name, "snapshot pump ended");
    });
    rx
}
