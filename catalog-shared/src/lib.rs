//! # Catalog Shared Library
//!
//! Shared types and persistence logic used by the catalog API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (products, categories, versions, users)
//! - `auth`: Password hashing, JWT issuance, and auth middleware types
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the catalog shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
