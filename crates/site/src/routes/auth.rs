//! Authentication route handlers.
//!
//! Login, registration, password reset, and logout against the identity
//! service (or its demo emulator). Failures travel as flash slugs in the
//! redirect query string; the pages map them back to display text.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Flash Messages
// =============================================================================

/// Map a flash slug from the query string to display text.
///
/// Slugs keep the redirect URLs free of arbitrary text; anything
/// unrecognized gets a generic message.
fn flash_message(slug: &str) -> &'static str {
    match slug {
        "credentials" => "Invalid email or password.",
        "email_taken" => "An account with this email already exists.",
        "password_mismatch" => "Passwords do not match.",
        "weak_password" => "Password must be at least 8 characters.",
        "invalid_email" => "That email address does not look valid.",
        "session" => "Could not start a session. Please try again.",
        "denied" => "The sign-in provider rejected the request.",
        "missing_code" | "missing_state" | "invalid_state" | "federated" => {
            "Federated sign-in failed. Please try again."
        }
        "federated_unavailable" => "Federated sign-in is not configured.",
        "reset_sent" => "If an account exists for that address, a reset email is on the way.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Flash slug for an authentication failure.
pub(super) const fn error_slug(error: &AuthError) -> &'static str {
    match error {
        AuthError::InvalidCredentials => "credentials",
        AuthError::EmailInUse => "email_taken",
        AuthError::WeakPassword(_) => "weak_password",
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::MissingCode => "missing_code",
        AuthError::Provider(_) | AuthError::Unexpected { .. } => "federated",
    }
}

fn mapped(slug: Option<String>) -> Option<&'static str> {
    slug.as_deref().map(flash_message)
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub error: Option<&'static str>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub user: Option<CurrentUser>,
    pub demo: bool,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Store the signed-in user in the session and tag Sentry events with it.
pub(super) async fn start_session(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.uid, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        user,
        demo: state.is_demo(),
        error: mapped(query.error),
        success: mapped(query.success),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth().sign_in(&form.email, &form.password).await {
        Ok(principal) => {
            let user = CurrentUser::from(principal);
            if let Err(e) = start_session(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to(&format!("/login?error={}", error_slug(&e))).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        user,
        demo: state.is_demo(),
        error: mapped(query.error),
    }
}

/// Handle registration form submission.
///
/// Creates the account, signs it in, and asks for a verification email
/// without blocking on the outcome.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    // Validate passwords match
    if form.password != form.password_confirm {
        return Redirect::to("/register?error=password_mismatch").into_response();
    }

    match state.auth().sign_up(&form.email, &form.password).await {
        Ok(principal) => {
            let user = CurrentUser::from(principal);

            if let Err(e) = state
                .auth()
                .request_email_verification(user.email.as_str())
                .await
            {
                tracing::warn!("Verification email request failed: {}", e);
            }

            if let Err(e) = start_session(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            Redirect::to(&format!("/register?error={}", error_slug(&e))).into_response()
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        user,
        demo: state.is_demo(),
        error: mapped(query.error),
        success: mapped(query.success),
    }
}

/// Handle forgot password form submission.
///
/// Always confirms, so the form cannot be used to probe which emails have
/// accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    if let Err(e) = state.auth().request_password_reset(&form.email).await {
        tracing::warn!("Password reset request failed: {}", e);
    }

    Redirect::to("/forgot-password?success=reset_sent").into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Clears the session and the Sentry user association.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    state.auth().sign_out().await;

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_messages_cover_auth_slugs() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::EmailInUse,
            AuthError::WeakPassword("too short".to_owned()),
            AuthError::MissingCode,
            AuthError::Unexpected {
                status: 500,
                message: "boom".to_owned(),
            },
        ];

        for error in &errors {
            let message = flash_message(error_slug(error));
            assert!(!message.is_empty());
            // Unknown slugs get the generic text; known ones must not.
            assert_ne!(message, flash_message("no-such-slug"));
        }
    }
}
