//! Static page route handlers: about, contact, blog, portfolio, 404.
//!
//! These pages carry fixed editorial content from [`crate::content`]; only
//! the shared header (signed-in user, demo banner) is dynamic.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::content::{self, BlogPost, PortfolioItem};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
}

/// Blog index template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/blog.html")]
pub struct BlogTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub posts: Vec<BlogPost>,
}

/// Portfolio page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/portfolio.html")]
pub struct PortfolioTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub items: Vec<PortfolioItem>,
    pub categories: Vec<String>,
    /// Currently selected filter chip, if any.
    pub active_category: Option<String>,
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the about page.
pub async fn about(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    AboutTemplate {
        user,
        demo: state.is_demo(),
    }
}

/// Display the contact page.
pub async fn contact(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    ContactTemplate {
        user,
        demo: state.is_demo(),
    }
}

/// Display the blog index.
pub async fn blog(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    BlogTemplate {
        user,
        demo: state.is_demo(),
        posts: content::blog_posts(),
    }
}

/// Query parameters for the portfolio filter.
#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
}

/// Display the portfolio, optionally filtered to one category.
///
/// An unknown category falls back to showing everything rather than an
/// empty grid.
pub async fn portfolio(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<PortfolioQuery>,
) -> impl IntoResponse {
    let categories = content::portfolio_categories();
    let active_category = query
        .category
        .filter(|category| categories.contains(category));

    let items = match &active_category {
        Some(category) => content::portfolio_items()
            .into_iter()
            .filter(|item| &item.category == category)
            .collect(),
        None => content::portfolio_items(),
    };

    PortfolioTemplate {
        user,
        demo: state.is_demo(),
        items,
        categories,
        active_category,
    }
}

/// Fallback handler for unknown routes.
pub async fn not_found(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    uri: Uri,
) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "page not found");

    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            user,
            demo: state.is_demo(),
        },
    )
}
