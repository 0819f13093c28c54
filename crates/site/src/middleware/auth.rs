//! Authentication middleware and extractors.
//!
//! Provides extractors for reading the signed-in account from the session
//! and for gating the admin area.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::filters;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in administrator.
///
/// Anonymous visitors are redirected to the login page; signed-in accounts
/// without admin access get a 403 page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(
///     RequireAdmin(user): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// 403 page shown to a signed-in account without admin access.
#[derive(Template, WebTemplate)]
#[template(path = "denied.html")]
struct DeniedTemplate {
    user: Option<CurrentUser>,
    demo: bool,
}

/// Rejection for [`RequireAdmin`].
pub enum AdminRejection {
    /// Not signed in; send the visitor to the login page.
    RedirectToLogin,
    /// Signed in, but the account is not an administrator.
    Denied {
        /// The non-admin account, for the page header.
        user: CurrentUser,
        /// Whether the process runs in demo mode, for the banner.
        demo: bool,
    },
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Denied { user, demo } => (
                StatusCode::FORBIDDEN,
                DeniedTemplate {
                    user: Some(user),
                    demo,
                },
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection::RedirectToLogin)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AdminRejection::RedirectToLogin)?;

        if !user.is_admin {
            let app = AppState::from_ref(state);
            return Err(AdminRejection::Denied {
                user,
                demo: app.is_demo(),
            });
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Never rejects; public pages use it to render the account state in the
/// header.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalUser(user): OptionalUser,
/// ) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.short_name()),
///         None => "Hello, visitor!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}
