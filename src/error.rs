//! Error types for the rsa_tokens library.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors produced by key generation, token handling and encryption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsaError {
    /// Caller input was rejected before any work was done.
    #[error("validation error: {0}")]
    Validation(&'static str),

    /// A token or ciphertext buffer could not be framed or unframed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Decrypted bytes are not valid UTF-8.
    #[error("decoding error: {0}")]
    Decoding(#[from] FromUtf8Error),

    /// The generated primes did not yield a usable key pair.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A number-theory operation has no defined result for its input.
    #[error("arithmetic error: {0}")]
    Arithmetic(&'static str),

    /// Key generation settings are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for RSA operations
pub type Result<T> = std::result::Result<T, RsaError>;
