//! Application services.

pub mod auth;

pub use auth::{AuthError, AuthService, Principal};
