//! ALL IN Catalog - store backends and repository.
//!
//! The product/service catalog lives in a remote document store and is
//! mirrored to every connected screen through per-collection snapshot
//! subscriptions. This crate provides:
//!
//! - [`RemoteStore`] - reqwest client for the document store REST API
//! - [`DemoStore`] - in-memory emulator selected when no store credentials
//!   are configured; mutates local state with simulated latency and resets
//!   on restart
//! - [`CatalogStore`] - the startup-selected strategy over the two backends
//! - [`MediaStorage`] - object storage for product images (remote bucket or
//!   in-memory demo blobs)
//! - [`CatalogRepository`] - the façade the web layer talks to: validated
//!   create/update/delete plus snapshot subscriptions that fall back to the
//!   built-in catalog when the store is unreachable
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! use allin_catalog::{CatalogRepository, CatalogStore, DemoMedia, DemoStore, MediaStorage};
//!
//! let store = CatalogStore::Demo(DemoStore::new(Duration::from_millis(300)));
//! let media = MediaStorage::Demo(DemoMedia::new(Duration::from_millis(300)));
//! let repository = CatalogRepository::new(store, media);
//!
//! let products = repository.products().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod defaults;
pub mod demo;
pub mod document;
pub mod error;
pub mod remote;
pub mod repository;
pub mod storage;
pub mod store;

pub use demo::DemoStore;
pub use document::Document;
pub use error::{CatalogError, StorageError, StoreError};
pub use remote::{RemoteStore, StoreConfig};
pub use repository::CatalogRepository;
pub use storage::{DemoMedia, MediaBlob, MediaStorage, ObjectStorage, StorageConfig};
pub use store::CatalogStore;
