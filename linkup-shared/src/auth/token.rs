//! Verification token generation
//!
//! Tokens are opaque, URL-safe strings embedded as a query parameter in the
//! email-change confirmation link.
//!
//! # Format
//!
//! 48 base62 characters (`[A-Za-z0-9]`), about 2^285 possible values.

use rand::Rng;

/// Length of a verification token (characters)
pub const VERIFICATION_TOKEN_LENGTH: usize = 48;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a new single-use verification token
///
/// # Example
///
/// ```
/// use linkup_shared::auth::token::generate_verification_token;
///
/// let token = generate_verification_token();
/// assert_eq!(token.len(), 48);
/// assert!(token.bytes().all(|b| b.is_ascii_alphanumeric()));
/// ```
pub fn generate_verification_token() -> String {
    let mut rng = rand::thread_rng();

    (0..VERIFICATION_TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
