//! # tasktrack_core
//!
//! Core domain logic for Tasktrack: credential hashing, token issuance and
//! verification, identity resolution, access guards, and the user/task stores
//! they read from.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod seed;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
