//! Integration tests for the public pages.
//!
//! Each test spawns its own demo-mode server in-process; no credentials or
//! external services are required.

use allin_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "OK");

    // Readiness flips once both demo collections deliver a snapshot.
    ctx.wait_ready().await;
    let resp = ctx.get("/health/ready").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_page_renders_hero_and_featured_products() {
    let ctx = TestContext::spawn().await;
    ctx.wait_ready().await;

    let resp = ctx.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");

    assert!(body.contains("Creative Media"));
    assert!(body.contains("Redefined"));
    assert!(body.contains("Why Choose Us"));

    // Three featured products, not the whole catalog.
    assert!(body.contains("Premium Brand Tee"));
    assert!(body.contains("Executive Notebook"));
    assert!(!body.contains("Umbrellas"));

    // Demo mode announces itself.
    assert!(body.contains("Demo mode"));
}

#[tokio::test]
async fn test_static_pages_render() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/about").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .text()
        .await
        .expect("Failed to read body")
        .contains("Our Story"));

    let resp = ctx.get("/contact").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .text()
        .await
        .expect("Failed to read body")
        .contains("Kigali"));

    let resp = ctx.get("/blog").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Insights, trends, and stories"));
    assert!(body.contains("The Future of Video Marketing in 2025"));
}

#[tokio::test]
async fn test_portfolio_category_filter() {
    let ctx = TestContext::spawn().await;

    // Unfiltered: every case study is on the page.
    let body = ctx
        .get("/portfolio")
        .await
        .text()
        .await
        .expect("Failed to read body");
    assert!(body.contains("BK Arena Branded Merchandise"));
    assert!(body.contains("Heineken Campaign Video"));

    // Filtered: only the matching category remains.
    let body = ctx
        .get("/portfolio?category=Video%20Production")
        .await
        .text()
        .await
        .expect("Failed to read body");
    assert!(body.contains("Heineken Campaign Video"));
    assert!(!body.contains("BK Arena Branded Merchandise"));

    // Unknown categories fall back to the full list instead of erroring.
    let resp = ctx.get("/portfolio?category=Skywriting").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("BK Arena Branded Merchandise"));
    assert!(body.contains("Heineken Campaign Video"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/no-such-page").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp
        .text()
        .await
        .expect("Failed to read body")
        .contains("Page not found"));
}

#[tokio::test]
async fn test_catalog_page_lists_both_collections() {
    let ctx = TestContext::spawn().await;
    ctx.wait_ready().await;

    let resp = ctx.get("/products-services").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");

    // Full seeded catalog, both collections.
    assert!(body.contains("Premium Brand Tee"));
    assert!(body.contains("Umbrellas"));
    assert!(body.contains("Logo Design"));

    // The grids are wired for live updates.
    assert!(body.contains(r#"data-live="products""#));
    assert!(body.contains(r#"data-render="product-cards""#));
    assert!(body.contains(r#"data-live="services""#));
    assert!(body.contains("/static/js/catalog-live.js"));
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let ctx = TestContext::spawn().await;

    let resp = ctx.get("/").await;
    let headers = resp.headers();

    assert_eq!(
        headers
            .get("x-frame-options")
            .expect("missing X-Frame-Options"),
        "DENY"
    );
    let csp = headers
        .get("content-security-policy")
        .expect("missing Content-Security-Policy")
        .to_str()
        .expect("CSP header is not UTF-8");
    assert!(csp.contains("script-src 'self'"));
}
