//! Media storage for catalog images.
//!
//! Live deployments upload to an object storage bucket over HTTP and hand
//! out public CDN URLs. Demo mode keeps blobs in process memory and hands
//! out relative `/media/{key}` URLs served by the web app itself, so the
//! admin screens behave identically without any storage credentials.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use allin_core::Collection;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::StorageError;

/// Header carrying the storage API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for the object storage bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL for write operations, without a trailing slash.
    pub base_url: String,
    /// Base URL prefixed onto object keys to form public URLs.
    pub public_base_url: String,
    /// API key sent with every write.
    pub api_key: SecretString,
}

/// A stored blob, as served back out of demo storage.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Object storage client for the live bucket.
#[derive(Clone)]
pub struct ObjectStorage {
    inner: Arc<ObjectStorageInner>,
}

struct ObjectStorageInner {
    client: reqwest::Client,
    base_url: String,
    public_base_url: String,
    api_key: SecretString,
}

impl ObjectStorage {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            inner: Arc::new(ObjectStorageInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                public_base_url: config.public_base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Upload a blob under `key` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bucket rejects the write.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let response = self
            .inner
            .client
            .put(format!("{}/{key}", self.inner.base_url))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        check_status(response).await?;
        Ok(format!("{}/{key}", self.inner.public_base_url))
    }

    /// Delete the object behind a public URL.
    ///
    /// Returns `Ok(false)` without touching the bucket when the URL was not
    /// issued by this storage (documents seeded with external image URLs),
    /// and when the object is already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the bucket rejects the
    /// delete for any reason other than a missing object.
    #[instrument(skip(self))]
    pub async fn delete_by_url(&self, url: &str) -> Result<bool, StorageError> {
        let prefix = format!("{}/", self.inner.public_base_url);
        let Some(key) = url.strip_prefix(&prefix) else {
            debug!("skipping delete of url outside this bucket");
            return Ok(false);
        };

        let response = self
            .inner
            .client
            .delete(format!("{}/{key}", self.inner.base_url))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        check_status(response).await?;
        Ok(true)
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await?;
    tracing::error!(
        status = %status,
        body = %text.chars().take(500).collect::<String>(),
        "object storage returned non-success status"
    );
    Err(StorageError::Unexpected {
        status: status.as_u16(),
        message: text.chars().take(200).collect(),
    })
}

/// In-memory media storage for demo mode.
#[derive(Clone)]
pub struct DemoMedia {
    inner: Arc<DemoMediaInner>,
}

struct DemoMediaInner {
    latency: Duration,
    blobs: Mutex<HashMap<String, MediaBlob>>,
}

/// URL prefix under which the web app serves demo blobs.
const DEMO_URL_PREFIX: &str = "/media/";

impl DemoMedia {
    /// Create empty demo storage with the given simulated latency.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::new(DemoMediaInner {
                latency,
                blobs: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Store a blob and return a relative URL the web app can serve.
    pub async fn upload(&self, key: &str, content_type: &str, bytes: Bytes) -> String {
        tokio::time::sleep(self.inner.latency).await;
        self.inner.blobs.lock().await.insert(
            key.to_owned(),
            MediaBlob {
                content_type: content_type.to_owned(),
                bytes,
            },
        );
        format!("{DEMO_URL_PREFIX}{key}")
    }

    /// Fetch a previously uploaded blob by key.
    pub async fn fetch(&self, key: &str) -> Option<MediaBlob> {
        self.inner.blobs.lock().await.get(key).cloned()
    }

    /// Remove the blob behind a `/media/…` URL. Foreign and unknown URLs
    /// are ignored.
    pub async fn delete_by_url(&self, url: &str) -> bool {
        let Some(key) = url.strip_prefix(DEMO_URL_PREFIX) else {
            return false;
        };
        tokio::time::sleep(self.inner.latency).await;
        self.inner.blobs.lock().await.remove(key).is_some()
    }
}

/// Media storage backing the catalog, selected at startup.
#[derive(Clone)]
pub enum MediaStorage {
    Remote(ObjectStorage),
    Demo(DemoMedia),
}

impl MediaStorage {
    /// Whether this is the in-memory demo variant.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }

    /// Upload image bytes for a collection and return the public URL.
    ///
    /// The object key is `{collection}/{millis}_{filename}` with the
    /// filename reduced to a safe character set, so repeated uploads of the
    /// same file never collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the live bucket rejects the write. Demo uploads
    /// cannot fail.
    pub async fn upload(
        &self,
        collection: Collection,
        filename: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = format!(
            "{collection}/{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );
        match self {
            Self::Remote(storage) => storage.upload(&key, content_type, bytes).await,
            Self::Demo(media) => Ok(media.upload(&key, content_type, bytes).await),
        }
    }

    /// Delete the object behind a public URL, returning whether anything
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the live bucket rejects the delete.
    pub async fn delete_by_url(&self, url: &str) -> Result<bool, StorageError> {
        match self {
            Self::Remote(storage) => storage.delete_by_url(url).await,
            Self::Demo(media) => Ok(media.delete_by_url(url).await),
        }
    }

    /// Fetch a demo blob by key. Always `None` on the live variant, which
    /// serves media from its public bucket instead.
    pub async fn local_blob(&self, key: &str) -> Option<MediaBlob> {
        match self {
            Self::Remote(_) => None,
            Self::Demo(media) => media.fetch(key).await,
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("mug photo.png"), "mug_photo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\x\shot.jpg"), "shot.jpg");
        assert_eq!(sanitize_filename("héllo.png"), "h_llo.png");
        assert_eq!(sanitize_filename("///"), "file");
    }

    #[tokio::test]
    async fn test_demo_upload_and_fetch() {
        let storage = MediaStorage::Demo(DemoMedia::new(Duration::ZERO));
        let url = storage
            .upload(
                Collection::Products,
                "mug.png",
                "image/png",
                Bytes::from_static(b"fake png"),
            )
            .await
            .unwrap();

        assert!(url.starts_with("/media/products/"));
        assert!(url.ends_with("_mug.png"));

        let key = url.strip_prefix("/media/").unwrap();
        let blob = storage.local_blob(key).await.unwrap();
        assert_eq!(blob.content_type, "image/png");
        assert_eq!(blob.bytes.as_ref(), b"fake png");
    }

    #[tokio::test]
    async fn test_demo_delete_by_url() {
        let media = DemoMedia::new(Duration::ZERO);
        let url = media
            .upload("products/1_a.png", "image/png", Bytes::from_static(b"x"))
            .await;

        assert!(media.delete_by_url(&url).await);
        // Second delete finds nothing.
        assert!(!media.delete_by_url(&url).await);
        assert!(media.fetch("products/1_a.png").await.is_none());
    }

    #[tokio::test]
    async fn test_demo_skips_foreign_urls() {
        let media = DemoMedia::new(Duration::ZERO);
        assert!(!media.delete_by_url("https://cdn.example.com/img.png").await);
    }

    #[tokio::test]
    async fn test_live_variant_has_no_local_blobs() {
        let storage = MediaStorage::Remote(
            ObjectStorage::new(&StorageConfig {
                base_url: "https://bucket.example.com/".to_owned(),
                public_base_url: "https://cdn.example.com".to_owned(),
                api_key: SecretString::from("k"),
            })
            .unwrap(),
        );
        assert!(!storage.is_demo());
        assert!(storage.local_blob("products/1_a.png").await.is_none());
    }
}
