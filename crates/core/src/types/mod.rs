//! Core types for the ALL IN Production site.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod icon;
pub mod id;

pub use email::{Email, EmailError};
pub use icon::IconKey;
pub use id::ItemId;
