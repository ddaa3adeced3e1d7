//! Storage error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during key record storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists with the given id.
    #[error("key record not found: {0}")]
    NotFound(Uuid),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("query error: {0}")]
    Query(String),

    /// A stored row could not be mapped to a record.
    #[error("serialization error: {0}")]
    Serialization(String),
}
