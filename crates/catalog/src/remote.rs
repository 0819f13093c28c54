//! Document store REST client.
//!
//! The live catalog lives in a hosted document store exposing a small JSON
//! API per collection: list, create, merge-update, delete. There is no push
//! channel on this API, so [`RemoteStore::subscribe`] polls the list
//! endpoint and emits a snapshot whenever the contents change.

use std::sync::Arc;
use std::time::Duration;

use allin_core::{Collection, ItemId};
use async_stream::stream;
use futures::Stream;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::document::Document;
use crate::error::StoreError;

/// Header carrying the store API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store API, without a trailing slash.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: SecretString,
    /// How often `subscribe` re-reads a collection.
    pub poll_interval: Duration,
}

/// Client for the document store API.
#[derive(Clone)]
pub struct RemoteStore {
    inner: Arc<RemoteStoreInner>,
}

struct RemoteStoreInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
struct WriteRequest {
    fields: Map<String, Value>,
}

impl RemoteStore {
    /// Create a new store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(RemoteStoreInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                poll_interval: config.poll_interval,
            }),
        })
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/v1/{collection}", self.inner.base_url)
    }

    fn document_url(&self, collection: Collection, id: &ItemId) -> String {
        format!("{}/v1/{collection}/{id}", self.inner.base_url)
    }

    /// Fetch the full contents of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store answers with a
    /// non-success status.
    #[instrument(skip(self))]
    pub async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.collection_url(collection))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .send()
            .await?;

        let body: DocumentsResponse = read_json(collection, None, response).await?;
        Ok(body.documents)
    }

    /// Create a document; the store assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store rejects the write.
    #[instrument(skip(self, fields))]
    pub async fn create(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let response = self
            .inner
            .client
            .post(self.collection_url(collection))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .json(&WriteRequest { fields })
            .send()
            .await?;

        read_json(collection, None, response).await
    }

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id does not exist; other variants for
    /// transport or store failures.
    #[instrument(skip(self, fields), fields(id = %id))]
    pub async fn update(
        &self,
        collection: Collection,
        id: &ItemId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .json(&WriteRequest { fields })
            .send()
            .await?;

        check_status(collection, id, response).await
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the id does not exist. Deletes are not
    /// idempotent; a second delete of the same id fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, collection: Collection, id: &ItemId) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .delete(self.document_url(collection, id))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .send()
            .await?;

        check_status(collection, id, response).await
    }

    /// Subscribe to full-collection snapshots by polling the list endpoint.
    ///
    /// A snapshot is emitted after the first successful read and then on
    /// every observed change. On the first store error the error is yielded
    /// once and the stream ends; the consumer decides what to serve from
    /// then on. There is no automatic retry within a subscription.
    pub fn subscribe(
        &self,
        collection: Collection,
    ) -> impl Stream<Item = Result<Vec<Document>, StoreError>> + Send + use<> {
        let store = self.clone();
        stream! {
            let mut last: Option<Vec<Document>> = None;
            loop {
                match store.list(collection).await {
                    Ok(docs) => {
                        if last.as_ref() != Some(&docs) {
                            debug!(collection = %collection, count = docs.len(), "snapshot changed");
                            last = Some(docs.clone());
                            yield Ok(docs);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
                tokio::time::sleep(store.inner.poll_interval).await;
            }
        }
    }

}

async fn read_json<T: DeserializeOwned>(
    collection: Collection,
    id: Option<&ItemId>,
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let status = response.status();

    // Capture the body as text first for better error diagnostics.
    let text = response.text().await?;

    if !status.is_success() {
        return Err(map_status(collection, id, status, &text));
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse document store response"
        );
        StoreError::Parse(e)
    })
}

async fn check_status(
    collection: Collection,
    id: &ItemId,
    response: reqwest::Response,
) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await?;
    Err(map_status(collection, Some(id), status, &text))
}

fn map_status(
    collection: Collection,
    id: Option<&ItemId>,
    status: StatusCode,
    body: &str,
) -> StoreError {
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => StoreError::NotFound {
            collection,
            id: id.clone(),
        },
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            tracing::error!(
                status = %status,
                collection = %collection,
                "document store rejected credentials"
            );
            StoreError::PermissionDenied {
                status: status.as_u16(),
            }
        }
        _ => {
            tracing::error!(
                status = %status,
                collection = %collection,
                body = %body.chars().take(500).collect::<String>(),
                "document store returned non-success status"
            );
            StoreError::Unexpected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_store() -> RemoteStore {
        RemoteStore::new(&StoreConfig {
            base_url: "https://store.example.com/".to_owned(),
            api_key: SecretString::from("test-key"),
            poll_interval: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let store = test_store();
        assert_eq!(
            store.collection_url(Collection::Products),
            "https://store.example.com/v1/products"
        );
        assert_eq!(
            store.document_url(Collection::Services, &ItemId::from("s9")),
            "https://store.example.com/v1/services/s9"
        );
    }

    #[test]
    fn test_map_status_not_found_requires_id() {
        let id = ItemId::from("gone");
        let err = map_status(
            Collection::Products,
            Some(&id),
            StatusCode::NOT_FOUND,
            "",
        );
        assert!(err.is_not_found());

        // A 404 on a collection URL is a misconfiguration, not a missing doc.
        let err = map_status(Collection::Products, None, StatusCode::NOT_FOUND, "nope");
        assert!(matches!(err, StoreError::Unexpected { status: 404, .. }));
    }

    #[test]
    fn test_map_status_permission() {
        let err = map_status(Collection::Products, None, StatusCode::FORBIDDEN, "denied");
        assert!(matches!(err, StoreError::PermissionDenied { status: 403 }));
    }

    #[test]
    fn test_map_status_truncates_body() {
        let long_body = "x".repeat(1000);
        let err = map_status(
            Collection::Products,
            None,
            StatusCode::INTERNAL_SERVER_ERROR,
            &long_body,
        );
        let StoreError::Unexpected { message, .. } = err else {
            panic!("wrong variant");
        };
        assert_eq!(message.len(), 200);
    }

    #[test]
    fn test_documents_response_shape() {
        let parsed: DocumentsResponse = serde_json::from_str(
            r#"{"documents":[{"id":"a","fields":{"name":"Tee"}},{"id":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.documents.len(), 2);
        assert_eq!(parsed.documents.first().unwrap().id, ItemId::from("a"));
    }
}
