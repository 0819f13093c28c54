//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use allin_core::{Product, Service};

use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

/// Display the full catalog, products and services together.
///
/// The initial grids are rendered server-side; the page then subscribes to
/// the snapshot streams and re-renders the grids in place when the catalog
/// changes.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    CatalogTemplate {
        user,
        demo: state.is_demo(),
        products: state.current_products().await,
        services: state.current_services().await,
    }
}
