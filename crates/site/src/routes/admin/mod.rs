//! Admin route handlers for the content-managed catalog.
//!
//! Every handler takes the [`RequireAdmin`] extractor, so anonymous
//! visitors are redirected to the login page and signed-in non-admins get
//! the denied page. Mutations redirect back to the list with a flash slug;
//! validation failures re-render the open form with the message inline.
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod products;
pub mod services;

use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body cap for the admin forms: the 5 MiB image plus text fields.
const MAX_FORM_BYTES: usize = 8 * 1024 * 1024;

/// Query parameters for flash display on the list pages.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a flash slug from the query string to display text.
fn flash_message(slug: &str) -> &'static str {
    match slug {
        "created" => "Created.",
        "updated" => "Changes saved.",
        "deleted" => "Deleted.",
        "missing" => "That item no longer exists.",
        _ => "Something went wrong. Please try again.",
    }
}

fn mapped(slug: Option<String>) -> Option<&'static str> {
    slug.as_deref().map(flash_message)
}

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_form))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit_form))
        .route(
            "/products/{id}/delete",
            get(products::delete_confirm).post(products::delete),
        )
        // Services
        .route("/services", get(services::index).post(services::create))
        .route("/services/new", get(services::new_form))
        .route("/services/{id}", post(services::update))
        .route("/services/{id}/edit", get(services::edit_form))
        .route(
            "/services/{id}/delete",
            get(services::delete_confirm).post(services::delete),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

/// Redirect bare `/admin` to the product list.
async fn index(RequireAdmin(_admin): RequireAdmin) -> Redirect {
    Redirect::to("/admin/products")
}
