//! # Quillpress Shared Library
//!
//! This crate contains the domain types and business logic behind the
//! Quillpress blog API.
//!
//! ## Module Organization
//!
//! - `models`: Tag and article rows plus their SQL operations
//! - `store`: Persistence gateway traits with PostgreSQL and in-memory backends
//! - `cache`: Key-value cache layer (Redis and in-memory) and the article snapshot cache
//! - `services`: Orchestration of stores and cache (cache-aside reads, invalidation)
//! - `auth`: Token issuance/validation, password hashing, credential verification
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod cache;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Quillpress shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
