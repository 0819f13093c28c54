//! Federated sign-in route handlers.
//!
//! Handles the OAuth flow for the "Continue with Google" button:
//! - Login: stores state/nonce in the session and redirects to the provider
//! - Callback: validates state, exchanges the code, starts the session
//!
//! Demo mode has no provider, so login short-circuits straight to the
//! callback and the emulator mints a fixed mock principal.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use tower_sessions::Session;
use url::Url;

use crate::config::AuthSettings;
use crate::models::{CurrentUser, session_keys};
use crate::routes::auth::{error_slug, start_session};
use crate::state::AppState;

/// Length of the generated state and nonce tokens.
const TOKEN_LENGTH: usize = 32;

/// Query parameters from the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for a principal.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a random URL-safe token.
fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Build the provider authorization URL, if federated sign-in is configured.
fn build_authorize_url(
    settings: &AuthSettings,
    redirect_uri: &str,
    state_token: &str,
    nonce: &str,
) -> Option<String> {
    let authorize_url = settings.federated_authorize_url.as_deref()?;
    let client_id = settings.federated_client_id.as_deref()?;

    let mut url = Url::parse(authorize_url).ok()?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", state_token)
        .append_pair("nonce", nonce);

    Some(url.to_string())
}

/// Initiate federated sign-in.
///
/// # Route
///
/// `GET /auth/federated/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    // Generate CSRF state and OpenID nonce
    let state_token = generate_token(TOKEN_LENGTH);
    let nonce = generate_token(TOKEN_LENGTH);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::FEDERATED_STATE, &state_token)
        .await
    {
        tracing::error!("Failed to store sign-in state in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    if let Err(e) = session
        .insert(session_keys::FEDERATED_NONCE, &nonce)
        .await
    {
        tracing::error!("Failed to store sign-in nonce in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    // No provider to visit in demo mode; complete the flow immediately.
    if state.is_demo() {
        let callback = format!("/auth/federated/callback?state={state_token}");
        return Redirect::to(&callback).into_response();
    }

    let redirect_uri = format!("{}/auth/federated/callback", state.config().base_url);
    let authorize_url = state
        .config()
        .auth
        .as_ref()
        .and_then(|settings| build_authorize_url(settings, &redirect_uri, &state_token, &nonce));

    match authorize_url {
        Some(url) => Redirect::to(&url).into_response(),
        None => {
            tracing::warn!("Federated sign-in requested but not configured");
            Redirect::to("/login?error=federated_unavailable").into_response()
        }
    }
}

/// Handle the provider callback.
///
/// Validates the state parameter, exchanges the authorization code for a
/// principal, and starts the session.
///
/// # Route
///
/// `GET /auth/federated/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for provider-reported errors
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Federated sign-in error: {} - {}", error, description);
        return Redirect::to("/login?error=denied").into_response();
    }

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Federated callback missing state");
        return Redirect::to("/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::FEDERATED_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Federated sign-in state mismatch");
        return Redirect::to("/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session
        .remove::<String>(session_keys::FEDERATED_STATE)
        .await;
    let _ = session
        .remove::<String>(session_keys::FEDERATED_NONCE)
        .await;

    match state.auth().sign_in_federated(query.code.as_deref()).await {
        Ok(principal) => {
            let user = CurrentUser::from(principal);
            if let Err(e) = start_session(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Federated sign-in failed: {}", e);
            Redirect::to(&format!("/login?error={}", error_slug(&e))).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_generate_token_is_url_safe() {
        let token = generate_token(TOKEN_LENGTH);
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn test_authorize_url_carries_oauth_params() {
        let settings = AuthSettings {
            api_url: "https://auth.example.com".to_owned(),
            api_key: SecretString::from("k"),
            federated_client_id: Some("client-1".to_owned()),
            federated_authorize_url: Some("https://provider.example.com/authorize".to_owned()),
        };

        let url = build_authorize_url(
            &settings,
            "https://site.example.com/auth/federated/callback",
            "state-token",
            "nonce-token",
        )
        .unwrap();

        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("client_id".to_owned(), "client-1".to_owned())));
        assert!(pairs.contains(&("response_type".to_owned(), "code".to_owned())));
        assert!(pairs.contains(&("state".to_owned(), "state-token".to_owned())));
        assert!(pairs.contains(&(
            "redirect_uri".to_owned(),
            "https://site.example.com/auth/federated/callback".to_owned()
        )));
    }

    #[test]
    fn test_authorize_url_requires_full_configuration() {
        let settings = AuthSettings {
            api_url: "https://auth.example.com".to_owned(),
            api_key: SecretString::from("k"),
            federated_client_id: None,
            federated_authorize_url: Some("https://provider.example.com/authorize".to_owned()),
        };

        assert!(build_authorize_url(&settings, "https://x/cb", "s", "n").is_none());
    }
}
