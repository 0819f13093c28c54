//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog snapshots arrived)
//!
//! # Pages
//! GET  /about                  - Company story and mission
//! GET  /contact                - Contact channels and hours
//! GET  /blog                   - Articles
//! GET  /portfolio              - Case studies, filterable by category
//!
//! # Catalog
//! GET  /products-services      - Product and service catalog
//! GET  /events/products        - Product grid updates (SSE)
//! GET  /events/services        - Service grid updates (SSE)
//! GET  /media/{*key}           - Uploaded images (demo mode)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! GET  /forgot-password        - Password reset page
//! POST /forgot-password        - Password reset action
//! POST /logout                 - Logout action
//!
//! # Federated sign-in
//! GET  /auth/federated/login   - Redirect to the identity provider
//! GET  /auth/federated/callback - Handle the provider callback
//!
//! # Admin (requires an admin session)
//! GET  /admin                  - Redirect to /admin/products
//! GET  /admin/products         - Product list
//! GET  /admin/products/new     - New product form
//! POST /admin/products         - Create product
//! GET  /admin/products/{id}/edit   - Edit product form
//! POST /admin/products/{id}       - Update product
//! GET  /admin/products/{id}/delete - Delete confirmation
//! POST /admin/products/{id}/delete - Delete product
//! GET  /admin/services         - Service list (same verbs as products)
//! ```

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod events;
pub mod federated;
pub mod home;
pub mod media;
pub mod pages;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the static page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/blog", get(pages::blog))
        .route("/portfolio", get(pages::portfolio))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products-services", get(catalog::index))
        .route("/events/products", get(events::products))
        .route("/events/services", get(events::services))
        .route("/media/{*key}", get(media::serve))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route("/logout", post(auth::logout))
        // Federated identity provider OAuth
        .route("/auth/federated/login", get(federated::login))
        .route("/auth/federated/callback", get(federated::callback))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Static pages
        .merge(page_routes())
        // Catalog, live updates, and media
        .merge(catalog_routes())
        // Auth routes
        .merge(auth_routes())
        // Admin routes (guarded per-handler by the admin extractor)
        .nest("/admin", admin::routes())
}

/// Build the complete application, ready to serve.
///
/// Everything except the listener lives here so integration tests can run
/// the real router in-process.
pub fn app(state: AppState) -> Router {
    let session_layer = crate::middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/site/static"))
        .fallback(pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "OK" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "OK"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable until both catalog collections have
/// delivered their first snapshot.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
