//! # Linkup Shared Library
//!
//! Record store, identity model and credential primitives behind the Linkup
//! identity backend. Nothing in this crate knows about HTTP.
//!
//! ## Module Organization
//!
//! - `store`: JSON document store with transactional writes
//! - `models`: Users and pending email changes, with their operations
//! - `auth`: Password schemes, JWTs, verification tokens, session resolution

pub mod auth;
pub mod models;
pub mod store;

/// Current version of the Linkup shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
