//! Server-sent event streams for live catalog updates.
//!
//! Each stream emits a `snapshot` event carrying the full collection as
//! JSON: once on subscription (if a snapshot has arrived) and again on every
//! change. Pages rebuild their grids from the payload client-side, so the
//! same stream serves the public catalog and the admin lists. The stream
//! ends when the snapshot publisher shuts down.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use tokio::sync::watch;
use tracing::instrument;

use allin_core::{Product, Service};

use crate::filters;
use crate::state::AppState;

/// A product card as sent to the page.
#[derive(Debug, Serialize)]
struct ProductCard {
    id: String,
    name: String,
    description: String,
    price: String,
    glyph: &'static str,
    image: Option<String>,
}

impl From<Product> for ProductCard {
    fn from(product: Product) -> Self {
        let glyph = filters::glyph_for(product.icon);
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price,
            glyph,
            image: product.image,
        }
    }
}

/// A service card as sent to the page.
#[derive(Debug, Serialize)]
struct ServiceCard {
    id: String,
    title: String,
    description: String,
    glyph: &'static str,
}

impl From<Service> for ServiceCard {
    fn from(service: Service) -> Self {
        let glyph = filters::glyph_for(service.icon);
        Self {
            id: service.id.to_string(),
            title: service.title,
            description: service.description,
            glyph,
        }
    }
}

/// Turn a snapshot watch into an SSE event stream.
fn snapshot_stream<T, C>(
    mut watch: watch::Receiver<Option<Vec<T>>>,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Clone + Send + Sync + 'static,
    C: Serialize + From<T>,
{
    async_stream::stream! {
        loop {
            let snapshot = watch.borrow_and_update().clone();
            if let Some(items) = snapshot {
                let cards: Vec<C> = items.into_iter().map(C::from).collect();
                match serde_json::to_string(&cards) {
                    Ok(payload) => yield Ok(Event::default().event("snapshot").data(payload)),
                    Err(error) => tracing::error!(%error, "failed to serialize snapshot"),
                }
            }
            if watch.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Stream product catalog snapshots.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(snapshot_stream::<Product, ProductCard>(
        state.products_watch(),
    ))
    .keep_alive(KeepAlive::default())
}

/// Stream service catalog snapshots.
#[instrument(skip(state))]
pub async fn services(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(snapshot_stream::<Service, ServiceCard>(
        state.services_watch(),
    ))
    .keep_alive(KeepAlive::default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;
    use serde_json::Value;

    use allin_core::{IconKey, ItemId};

    use super::*;

    fn product() -> Product {
        Product {
            id: ItemId::from("p-1"),
            name: "Premium Brand Tee".to_owned(),
            description: "Ultra-soft cotton blend".to_owned(),
            price: "$45".to_owned(),
            icon: IconKey::TShirt,
            image: None,
        }
    }

    #[test]
    fn test_product_card_carries_glyph() {
        let card = ProductCard::from(product());
        assert_eq!(card.glyph, filters::glyph_for(IconKey::TShirt));

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json.get("id").and_then(Value::as_str), Some("p-1"));
        assert_eq!(json.get("price").and_then(Value::as_str), Some("$45"));
        assert_eq!(json.get("image"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_stream_emits_current_snapshot_then_waits() {
        let (tx, rx) = watch::channel(Some(vec![product()]));
        let stream = snapshot_stream::<Product, ProductCard>(rx);
        futures::pin_mut!(stream);

        assert!(stream.next().await.is_some());

        // Publisher gone: the stream ends instead of hanging.
        drop(tx);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_skips_emission_before_first_snapshot() {
        let (tx, rx) = watch::channel::<Option<Vec<Product>>>(None);
        let stream = snapshot_stream::<Product, ProductCard>(rx);
        futures::pin_mut!(stream);

        tx.send(Some(vec![product()])).unwrap();
        // The first item is the post-change snapshot, not an empty event.
        assert!(stream.next().await.is_some());
    }
}
