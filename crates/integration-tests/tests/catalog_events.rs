//! Integration tests for the live catalog snapshot streams.
//!
//! Each test spawns its own demo-mode server in-process and reads the SSE
//! endpoints with a plain HTTP client, the same way the page script does.

use allin_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::Value;

fn text<'a>(card: &'a Value, key: &str) -> &'a str {
    card.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[tokio::test]
async fn test_event_stream_content_type() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/events/products").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .expect("missing content type")
        .to_str()
        .expect("content type is not UTF-8");
    assert!(content_type.starts_with("text/event-stream"));
}

#[tokio::test]
async fn test_snapshot_streams_open_with_current_contents() {
    let ctx = TestContext::spawn().await;
    ctx.wait_ready().await;

    let mut products = ctx.open_events("products").await;
    let snapshot = products.next_snapshot().await;
    assert_eq!(snapshot.len(), 8);
    assert!(snapshot
        .iter()
        .any(|card| text(card, "name") == "Premium Brand Tee"));

    // Cards carry exactly what the grid renders.
    let first = snapshot.first().expect("empty snapshot");
    assert!(first.get("price").is_some());
    assert!(first.get("glyph").is_some());
    assert!(first.get("description").is_some());

    let mut services = ctx.open_events("services").await;
    let snapshot = services.next_snapshot().await;
    assert_eq!(snapshot.len(), 6);
    assert!(snapshot
        .iter()
        .any(|card| text(card, "title") == "Logo Design"));
}

#[tokio::test]
async fn test_mutations_push_new_snapshots() {
    let ctx = TestContext::spawn().await;
    ctx.wait_ready().await;

    // Subscribe before mutating; the first event is the seeded catalog.
    let mut events = ctx.open_events("services").await;
    let first = events.next_snapshot().await;
    assert_eq!(first.len(), 6);

    ctx.sign_in("boss@allin-production.com").await;
    let resp = ctx
        .post_form(
            "/admin/services",
            &[
                ("title", "Mural Painting"),
                ("description", "Large-format wall art for offices and venues."),
                ("icon", "palette"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // The already-open stream delivers the grown collection on its own.
    let mut seen = false;
    for _ in 0..5 {
        let snapshot = events.next_snapshot().await;
        if snapshot
            .iter()
            .any(|card| text(card, "title") == "Mural Painting")
        {
            seen = true;
            break;
        }
    }
    assert!(seen, "create never reached the snapshot stream");
}

#[tokio::test]
async fn test_deletes_shrink_the_snapshot() {
    let ctx = TestContext::spawn().await;
    ctx.wait_ready().await;

    let mut events = ctx.open_events("products").await;
    let first = events.next_snapshot().await;
    assert_eq!(first.len(), 8);

    ctx.sign_in("boss@allin-production.com").await;
    // Seeded ids are stable, so the confirmation page lookup is not needed.
    let resp = ctx.post_form("/admin/products/8/delete", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let mut seen = false;
    for _ in 0..5 {
        let snapshot = events.next_snapshot().await;
        if snapshot.len() == 7 && !snapshot.iter().any(|card| text(card, "name") == "Umbrellas") {
            seen = true;
            break;
        }
    }
    assert!(seen, "delete never reached the snapshot stream");
}
