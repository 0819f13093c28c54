//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use allin_core::Email;

use crate::services::Principal;

/// Session-stored user identity.
///
/// The admin flag is computed once at sign-in and persisted with the
/// session, so changing the suffix rule does not retroactively affect
/// sessions already issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Opaque account id from the identity service.
    pub uid: String,
    /// Account email.
    pub email: Email,
    /// Display name, when the account has one.
    pub display_name: Option<String>,
    /// Whether the email was verified by the identity service.
    pub email_verified: bool,
    /// Whether this session may use the admin screens.
    pub is_admin: bool,
}

impl From<Principal> for CurrentUser {
    fn from(principal: Principal) -> Self {
        let is_admin = principal.is_admin();
        Self {
            uid: principal.uid,
            email: principal.email,
            display_name: principal.display_name,
            email_verified: principal.email_verified,
            is_admin,
        }
    }
}

impl CurrentUser {
    /// Short name shown in the header: display name if set, else the part
    /// of the email before the `@`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the federated sign-in state token (CSRF protection).
    pub const FEDERATED_STATE: &str = "federated_state";

    /// Key for the federated sign-in OpenID nonce.
    pub const FEDERATED_NONCE: &str = "federated_nonce";
}
