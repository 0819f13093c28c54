//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use allin_core::{Product, Service};

use crate::content::{self, Reason};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Hero Configuration (Static content)
// =============================================================================

/// Hero banner content.
#[derive(Clone)]
pub struct HeroConfig {
    pub title_top: String,
    pub title_accent: String,
    pub subtitle: String,
    pub button_text: String,
    pub button_url: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title_top: "Creative Media".to_string(),
            title_accent: "Redefined".to_string(),
            subtitle: "Elevating brands through stunning visual media and premium branded \
                       products. Where creativity meets luxury, and innovation drives excellence."
                .to_string(),
            button_text: "Explore Our Work".to_string(),
            button_url: "/products-services".to_string(),
        }
    }
}

// =============================================================================
// Mission Section (Static content)
// =============================================================================

/// A card in the mission grid.
#[derive(Clone)]
pub struct MissionPoint {
    pub title: String,
    pub description: String,
}

/// Mission section content.
#[derive(Clone)]
pub struct MissionConfig {
    pub statement: String,
    pub points: Vec<MissionPoint>,
    pub story_heading: String,
    pub story: String,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            statement: "To revolutionize brand experiences through exceptional creative media \
                        and premium products, empowering businesses to connect with their \
                        audiences in meaningful, impactful ways."
                .to_string(),
            points: vec![
                MissionPoint {
                    title: "Precision Excellence".to_string(),
                    description: "Every project crafted with meticulous attention to detail and \
                                  unwavering quality standards."
                        .to_string(),
                },
                MissionPoint {
                    title: "Creative Innovation".to_string(),
                    description: "Pushing boundaries with cutting-edge design and revolutionary \
                                  creative solutions."
                        .to_string(),
                },
                MissionPoint {
                    title: "Client Partnership".to_string(),
                    description: "Building lasting relationships through transparent \
                                  collaboration and shared success."
                        .to_string(),
                },
                MissionPoint {
                    title: "Future-Forward".to_string(),
                    description: "Anticipating trends and delivering solutions that keep our \
                                  clients ahead of the curve."
                        .to_string(),
                },
            ],
            story_heading: "Why We Built All In International".to_string(),
            story: "In a world saturated with generic content and mass-produced merchandise, we \
                    saw an opportunity to create something extraordinary. All In International \
                    was born from the belief that every brand deserves to stand out with premium \
                    quality, innovative design, and authentic storytelling. We're not just a \
                    service provider – we're creative partners dedicated to elevating your brand \
                    to new heights of excellence and recognition."
                .to_string(),
        }
    }
}

// =============================================================================
// Template and Handler
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Signed-in user for the header, if any.
    pub user: Option<CurrentUser>,
    /// Whether the demo-mode banner is shown.
    pub demo: bool,
    /// Hero banner content.
    pub hero: HeroConfig,
    /// Mission section content.
    pub mission: MissionConfig,
    /// Products for the featured grid.
    pub products: Vec<Product>,
    /// Services for the overview grid.
    pub services: Vec<Service>,
    /// "Why choose us" cards.
    pub reasons: Vec<Reason>,
}

/// Number of products featured on the home page.
const FEATURED_PRODUCTS: usize = 3;

/// Display the home page.
#[instrument(skip(state, user))]
pub async fn home(State(state): State<AppState>, OptionalUser(user): OptionalUser) -> impl IntoResponse {
    let mut products = state.current_products().await;
    products.truncate(FEATURED_PRODUCTS);

    let services = state.current_services().await;

    HomeTemplate {
        user,
        demo: state.is_demo(),
        hero: HeroConfig::default(),
        mission: MissionConfig::default(),
        products,
        services,
        reasons: content::reasons(),
    }
}
