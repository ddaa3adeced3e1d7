//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid master key material.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The ciphertext is not a structurally valid envelope.
    ///
    /// Raised before any key derivation is attempted.
    #[error("invalid ciphertext format")]
    InvalidFormat,

    /// Decryption failed.
    ///
    /// Deliberately carries no detail: tag mismatch, wrong master key, and
    /// corrupted payload are indistinguishable to the caller.
    #[error("decryption failed")]
    DecryptionFailed,
}
