//! # Roost Storage
//!
//! Storage abstraction for API key records.
//!
//! Provides the record model, the [`KeyStore`] trait the key service is
//! written against, and an in-memory backend for tests. The production
//! SQLite backend lives in `roost-storage-sqlite`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryKeyStore;
pub use record::{KeyQuery, KeyRecord, KeyRecordPatch, NewKeyRecord, PlatformType};
pub use store::KeyStore;
