//! Shared HTTP extractors.

pub mod auth;

pub use auth::AuthUser;
