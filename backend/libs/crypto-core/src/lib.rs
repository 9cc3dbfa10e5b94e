//! Shared cryptographic primitives for the SNS services.
//!
//! * [`jwt`] issues and validates HS256 access tokens.
//! * [`password`] hashes and verifies passwords with Argon2id.
//! * [`hash`] digests opaque tokens before they are stored.
//! * [`token`] generates random refresh, reset and verification tokens.

pub mod hash;
pub mod jwt;
pub mod password;
pub mod token;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("invalid password hash: {0}")]
    InvalidHash(String),
}
