//! ALL IN Core - Shared types library.
//!
//! This crate provides common types used across all ALL IN Production
//! components:
//! - `site` - Public website and gated admin panel
//! - `catalog` - Store backends and repository
//! - `cli` - Command-line tools for seeding and inspection
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and icon keys
//! - [`catalog`] - Catalog item shapes, drafts, and draft validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
