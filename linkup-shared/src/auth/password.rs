//! Credential storage and verification
//!
//! Two storage schemes are supported:
//!
//! - **Plaintext**: the credential is stored as typed and compared exactly.
//!   This is what hand-written fixture files contain and what the end-to-end
//!   suites expect to find on disk. Never use it for real accounts.
//! - **Argon2**: Argon2id with 64 MB memory, 3 iterations, 4 lanes, stored as
//!   a PHC string.
//!
//! Verification does not depend on the active scheme: PHC strings are checked
//! with Argon2, anything else with an exact comparison. Switching a store from
//! plaintext to Argon2 therefore keeps existing accounts working, and each
//! password change upgrades that account.
//!
//! # Example
//!
//! ```
//! use linkup_shared::auth::password::{verify_credential, PasswordScheme};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let stored = PasswordScheme::Argon2.encode("super_secret_password_123")?;
//! assert!(verify_credential("super_secret_password_123", &stored)?);
//! assert!(!verify_credential("wrong_password", &stored)?);
//!
//! let fixture = PasswordScheme::Plaintext.encode("07032004")?;
//! assert_eq!(fixture, "07032004");
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Prefix shared by all Argon2 PHC strings
const ARGON2_PREFIX: &str = "$argon2";

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Unknown scheme name in configuration
    #[error("Unknown password scheme: {0} (expected \"plaintext\" or \"argon2\")")]
    UnknownScheme(String),
}

/// How new credentials are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Store the password as typed
    #[default]
    Plaintext,

    /// Store an Argon2id PHC string
    Argon2,
}

impl PasswordScheme {
    /// Produces the stored form of `password`
    pub fn encode(&self, password: &str) -> Result<String, PasswordError> {
        match self {
            PasswordScheme::Plaintext => Ok(password.to_string()),
            PasswordScheme::Argon2 => hash_password(password),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordScheme::Plaintext => "plaintext",
            PasswordScheme::Argon2 => "argon2",
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(PasswordScheme::Plaintext),
            "argon2" | "argon2id" => Ok(PasswordScheme::Argon2),
            other => Err(PasswordError::UnknownScheme(other.to_string())),
        }
    }
}

/// Checks `password` against a stored credential of either scheme
///
/// # Errors
///
/// Returns an error only when `stored` looks like a PHC string but cannot be
/// parsed or verified.
pub fn verify_credential(password: &str, stored: &str) -> Result<bool, PasswordError> {
    if stored.starts_with(ARGON2_PREFIX) {
        verify_password(password, stored)
    } else {
        Ok(password == stored)
    }
}

/// Hashes a password using Argon2id
///
/// # Security Parameters
///
/// - Memory: 64 MB (65536 KB)
/// - Iterations: 3 passes
/// - Parallelism: 4 lanes
/// - Salt: 16 bytes random from the OS RNG
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against an Argon2 PHC string
///
/// Parameters are read from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}
