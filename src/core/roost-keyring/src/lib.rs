//! # Roost Keyring
//!
//! API key lifecycle management for platform credentials.
//!
//! ## Features
//!
//! - Encrypted-at-rest storage of third-party API keys
//! - In-place rotation preserving record identity
//! - Expiration semantics (expired keys are never served)
//! - Soft deactivation with full audit retention
//! - Request-time validation against the active stored key
//!
//! The service is the sole reader and writer of key records. It owns the
//! business rules; encryption lives in `roost-crypto` and persistence
//! behind the `roost-storage` store trait, both injected at construction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod service;

pub use config::KeyringConfig;
pub use error::{ErrorCode, KeyringError};
pub use service::{ApiKeyService, KeyValidation};

pub use roost_storage::{KeyRecord, PlatformType};
