//! Keyring error taxonomy.
//!
//! Every public service operation returns `Result<T, KeyringError>`. The
//! service converts internal failures (crypto, store) into these typed
//! errors; callers inspect the code, they never catch panics or see the
//! engine's own error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Sealing the raw key failed; nothing was persisted.
    EncryptionFailed,
    /// The stored envelope could not be opened.
    DecryptionFailed,
    /// No matching key record exists.
    KeyNotFound,
    /// The matching key record is past its expiration.
    KeyExpired,
    /// The underlying store rejected or failed the operation.
    DatabaseError,
    /// A presented key does not match the active stored key.
    InvalidKey,
    /// Input failed a business rule (name bounds, platform cap).
    ValidationError,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::EncryptionFailed => "ENCRYPTION_FAILED",
            ErrorCode::DecryptionFailed => "DECRYPTION_FAILED",
            ErrorCode::KeyNotFound => "KEY_NOT_FOUND",
            ErrorCode::KeyExpired => "KEY_EXPIRED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidKey => "INVALID_KEY",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
        }
    }

    /// Whether the failure is in the service's own infrastructure rather
    /// than the caller's input or credential.
    pub fn is_infrastructure(self) -> bool {
        matches!(
            self,
            ErrorCode::EncryptionFailed | ErrorCode::DecryptionFailed | ErrorCode::DatabaseError
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed keyring failure.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct KeyringError {
    /// Failure category.
    pub code: ErrorCode,
    /// Human-readable description, safe to surface to users.
    pub message: String,
    /// Optional diagnostics (e.g. the underlying store message).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl KeyringError {
    /// Creates an error with a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches diagnostic details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
