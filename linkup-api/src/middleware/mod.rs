//! Middleware for the API server
//!
//! - `security`: Response hardening headers
//! - `session`: Resolves the current user for account routes

pub mod security;
pub mod session;
