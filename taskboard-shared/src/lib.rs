//! # Taskboard Shared Library
//!
//! This crate contains shared types, database models, and business logic used
//! by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication, token verification, and authorization
//! - `audit`: Audit trail recorder and change diffing
//! - `db`: Connection pool and migration runner

pub mod audit;
pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
