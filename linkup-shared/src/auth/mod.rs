//! Authentication primitives
//!
//! # Modules
//!
//! - [`password`]: Credential storage schemes (plaintext fixture, Argon2id)
//! - [`jwt`]: Access and refresh token generation and validation
//! - [`token`]: Single-use email verification tokens
//! - [`session`]: Resolving the caller's identity from request credentials

pub mod jwt;
pub mod password;
pub mod session;
pub mod token;
