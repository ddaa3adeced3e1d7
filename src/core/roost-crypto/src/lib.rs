//! # Roost Crypto
//!
//! Envelope encryption for platform API credentials.
//!
//! This crate provides the encryption engine used by Roost to protect
//! third-party API keys at rest:
//! - AES-256-GCM authenticated encryption
//! - Per-envelope key derivation (Argon2id) from a process-wide master key
//! - Self-describing ciphertext envelopes (salt, IV, and tag travel with
//!   the ciphertext)
//! - Master key rotation without persisting plaintext

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod keys;
pub mod random;

pub use envelope::EncryptionEngine;
pub use error::CryptoError;
pub use keys::MasterKey;
