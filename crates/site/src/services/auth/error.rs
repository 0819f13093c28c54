//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] allin_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("email already in use")]
    EmailInUse,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Federated callback arrived without an authorization code.
    #[error("missing authorization code")]
    MissingCode,

    /// Transport failure talking to the identity service.
    #[error("identity provider error: {0}")]
    Provider(#[from] reqwest::Error),

    /// Identity service answered with an unexpected status.
    #[error("identity provider returned status {status}: {message}")]
    Unexpected { status: u16, message: String },
}
