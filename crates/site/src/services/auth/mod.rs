//! Authentication service.
//!
//! Sessions are issued by an external identity service reached over HTTP.
//! In demo mode the whole service is replaced by an in-memory emulator that
//! accepts any credentials, fabricates principals with a simulated delay,
//! and never contacts the network.

mod error;

pub use error::AuthError;

use std::sync::Arc;
use std::time::Duration;

use allin_core::Email;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AuthSettings;

/// Email suffix that grants access to the admin screens.
///
/// The admin flag is derived from the account email on this side of the
/// trust boundary; the identity service does not issue a role claim.
pub const ADMIN_EMAIL_SUFFIX: &str = "@allin-production.com";

/// Minimum password length for new accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Simulated latency for demo-mode auth operations.
pub const DEMO_AUTH_LATENCY: Duration = Duration::from_millis(500);

// =============================================================================
// Principal
// =============================================================================

/// An authenticated identity as issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque account id.
    pub uid: String,
    /// Account email.
    pub email: Email,
    /// Display name, when the account has one.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Whether the identity service considers the email verified.
    #[serde(default)]
    pub email_verified: bool,
}

impl Principal {
    /// Whether this principal may use the admin screens.
    ///
    /// Purely an email-suffix check, case-insensitive.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.email.has_suffix(ADMIN_EMAIL_SUFFIX)
    }
}

// =============================================================================
// Remote identity service
// =============================================================================

/// HTTP client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

/// Header carrying the identity API key.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct CodeRequest<'a> {
    code: &'a str,
}

/// Error body the identity service attaches to non-success responses.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl IdentityClient {
    /// Create a new identity service client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(settings: &AuthSettings) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                base_url: settings.api_url.trim_end_matches('/').to_owned(),
                api_key: settings.api_key.clone(),
            }),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .inner
            .client
            .post(format!("{}{path}", self.inner.base_url))
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let response = self
            .post("/v1/accounts", &CredentialsRequest { email, password })
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(AuthError::EmailInUse),
            StatusCode::BAD_REQUEST => {
                Err(AuthError::WeakPassword(error_message(response).await))
            }
            _ => read_principal(response).await,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let response = self
            .post("/v1/sessions", &CredentialsRequest { email, password })
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        read_principal(response).await
    }

    async fn exchange_code(&self, code: &str) -> Result<Principal, AuthError> {
        let response = self.post("/v1/federated/exchange", &CodeRequest { code }).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        read_principal(response).await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let response = self.post("/v1/password-resets", &EmailRequest { email }).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(AuthError::Unexpected {
            status: status.as_u16(),
            message: error_message(response).await,
        })
    }

    async fn request_email_verification(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .post("/v1/verification-emails", &EmailRequest { email })
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(AuthError::Unexpected {
            status: status.as_u16(),
            message: error_message(response).await,
        })
    }
}

/// Parse a principal out of a success response; map everything else to
/// [`AuthError::Unexpected`].
async fn read_principal(response: reqwest::Response) -> Result<Principal, AuthError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %text.chars().take(500).collect::<String>(),
            "identity service returned non-success status"
        );
        return Err(AuthError::Unexpected {
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(error = %e, "failed to parse identity service response");
        AuthError::Unexpected {
            status: status.as_u16(),
            message: "malformed principal payload".to_owned(),
        }
    })
}

async fn error_message(response: reqwest::Response) -> String {
    let body: ErrorBody = response.json().await.unwrap_or_default();
    if body.message.is_empty() {
        "request rejected".to_owned()
    } else {
        body.message
    }
}

// =============================================================================
// Demo emulator
// =============================================================================

/// In-memory identity emulator for demo mode.
///
/// Sign-in accepts any password and fabricates a fresh principal for the
/// given email. Nothing is persisted; sign-up does not create an account
/// that sign-in later checks against.
#[derive(Debug, Clone)]
pub struct DemoAuth {
    latency: Duration,
}

impl DemoAuth {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    fn principal_for(email: Email) -> Principal {
        let display_name = Some(email.local_part().to_owned());
        Principal {
            uid: format!("demo-user-{}", chrono::Utc::now().timestamp_millis()),
            email,
            display_name,
            email_verified: true,
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        tokio::time::sleep(self.latency).await;
        debug!(email = %email, "demo sign-up");
        Ok(Self::principal_for(email))
    }

    async fn sign_in(&self, email: &str) -> Result<Principal, AuthError> {
        let email = Email::parse(email)?;
        tokio::time::sleep(self.latency).await;
        debug!(email = %email, "demo sign-in");
        Ok(Self::principal_for(email))
    }

    async fn sign_in_federated(&self) -> Result<Principal, AuthError> {
        tokio::time::sleep(self.latency).await;
        let email = Email::parse("demo.user@gmail.com")?;
        Ok(Principal {
            uid: format!("demo-google-user-{}", chrono::Utc::now().timestamp_millis()),
            email,
            display_name: Some("Demo Google User".to_owned()),
            email_verified: true,
        })
    }

    async fn sign_out(&self) {
        tokio::time::sleep(self.latency).await;
    }
}

// =============================================================================
// Service facade
// =============================================================================

/// The identity backend, selected once at startup.
#[derive(Clone)]
pub enum AuthService {
    Remote(IdentityClient),
    Demo(DemoAuth),
}

impl AuthService {
    /// Whether this is the in-memory demo variant.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidEmail`] or [`AuthError::WeakPassword`] on bad
    /// input, [`AuthError::EmailInUse`] when the account already exists.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        match self {
            Self::Remote(client) => client.sign_up(email, password).await,
            Self::Demo(demo) => demo.sign_up(email, password).await,
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when the identity service rejects
    /// the pair. The demo emulator accepts any password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        match self {
            Self::Remote(client) => client.sign_in(email, password).await,
            Self::Demo(demo) => demo.sign_in(email).await,
        }
    }

    /// Complete a federated sign-in.
    ///
    /// Live mode exchanges the authorization code from the provider
    /// callback; demo mode ignores `code` and signs in a fixed mock account.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCode`] when live mode is called without a code.
    #[instrument(skip(self, code))]
    pub async fn sign_in_federated(&self, code: Option<&str>) -> Result<Principal, AuthError> {
        match self {
            Self::Remote(client) => {
                let code = code.ok_or(AuthError::MissingCode)?;
                client.exchange_code(code).await
            }
            Self::Demo(demo) => demo.sign_in_federated().await,
        }
    }

    /// Ask the identity service to send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers deliberately do not
    /// surface which emails exist.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self {
            Self::Remote(client) => client.request_password_reset(email).await,
            Self::Demo(demo) => {
                tokio::time::sleep(demo.latency).await;
                debug!(email, "demo password reset request");
                Ok(())
            }
        }
    }

    /// Ask the identity service to send an address verification email.
    ///
    /// Called after registration; sign-in does not depend on the outcome,
    /// so callers treat a failure as a warning. Demo mode does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity service rejects the request.
    #[instrument(skip(self))]
    pub async fn request_email_verification(&self, email: &str) -> Result<(), AuthError> {
        match self {
            Self::Remote(client) => client.request_email_verification(email).await,
            Self::Demo(_) => Ok(()),
        }
    }

    /// End the provider-side session. The caller clears its own session
    /// cookie separately.
    pub async fn sign_out(&self) {
        if let Self::Demo(demo) = self {
            demo.sign_out().await;
        }
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn demo_service() -> AuthService {
        AuthService::Demo(DemoAuth::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_demo_sign_in_accepts_any_password() {
        let auth = demo_service();
        let principal = auth.sign_in("visitor@gmail.com", "whatever").await.unwrap();

        assert_eq!(principal.email.as_str(), "visitor@gmail.com");
        assert_eq!(principal.display_name.as_deref(), Some("visitor"));
        assert!(principal.email_verified);
        assert!(principal.uid.starts_with("demo-user-"));
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn test_admin_suffix_grants_admin() {
        let auth = demo_service();
        let principal = auth
            .sign_in("owner@allin-production.com", "pw")
            .await
            .unwrap();
        assert!(principal.is_admin());

        // Suffix check is case-insensitive.
        let shouty = auth
            .sign_in("OWNER@ALLIN-PRODUCTION.COM", "pw")
            .await
            .unwrap();
        assert!(shouty.is_admin());
    }

    #[tokio::test]
    async fn test_demo_sign_up_validates_input() {
        let auth = demo_service();

        let err = auth.sign_up("not-an-email", "long-enough-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));

        let err = auth.sign_up("new@gmail.com", "short").await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_demo_federated_sign_in() {
        let auth = demo_service();
        let principal = auth.sign_in_federated(None).await.unwrap();

        assert_eq!(principal.email.as_str(), "demo.user@gmail.com");
        assert_eq!(principal.display_name.as_deref(), Some("Demo Google User"));
        assert!(principal.uid.starts_with("demo-google-user-"));
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn test_demo_password_reset_is_a_no_op() {
        let auth = demo_service();
        auth.request_password_reset("anyone@gmail.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_demo_verification_email_is_a_no_op() {
        let auth = demo_service();
        auth.request_email_verification("anyone@gmail.com").await.unwrap();
    }
}
