//! The API key service.
//!
//! Orchestrates the encryption engine and the record store to implement
//! the key lifecycle: `created (active) -> rotated (active)* ->
//! deactivated (terminal)`. No transition re-activates a deactivated key
//! and no record is ever deleted.
//!
//! Operations run sequentially within a call; no cross-caller ordering is
//! guaranteed. The per-platform cap is a check-then-insert without a
//! transactional guard, so concurrent `add_key` calls can race past it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use roost_crypto::EncryptionEngine;
use roost_storage::{KeyQuery, KeyRecord, KeyRecordPatch, KeyStore, NewKeyRecord, PlatformType, StoreError};

use crate::config::KeyringConfig;
use crate::error::{ErrorCode, KeyringError};

/// Outcome of validating a presented key against the active stored key.
#[derive(Debug, Clone)]
pub struct KeyValidation {
    /// Whether the presented key matches the active key.
    pub is_valid: bool,
    /// The failure that made the key invalid, if any.
    pub error: Option<KeyringError>,
}

/// Sole mutator and reader of API key records.
///
/// Construct one per process with an injected store and engine, and hand
/// it to consumers explicitly (middleware, HTTP handlers).
pub struct ApiKeyService {
    store: Arc<dyn KeyStore>,
    engine: EncryptionEngine,
    config: KeyringConfig,
}

impl ApiKeyService {
    /// Creates a service with default configuration.
    pub fn new(store: Arc<dyn KeyStore>, engine: EncryptionEngine) -> Self {
        Self::with_config(store, engine, KeyringConfig::default())
    }

    /// Creates a service with explicit configuration.
    pub fn with_config(
        store: Arc<dyn KeyStore>,
        engine: EncryptionEngine,
        config: KeyringConfig,
    ) -> Self {
        Self {
            store,
            engine,
            config,
        }
    }

    /// Encrypts and stores a new key for a platform.
    ///
    /// The returned record carries the ciphertext envelope, never the raw
    /// key. New keys are active; expiration falls back to
    /// `default_expiration_days` when the caller passes none.
    pub async fn add_key(
        &self,
        platform: PlatformType,
        raw_key: &str,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<KeyRecord, KeyringError> {
        self.validate_key_name(name)?;

        let encrypted_key = self.encrypt_raw_key(raw_key)?;

        if let Some(cap) = self.config.max_keys_per_platform {
            let count = self
                .store
                .count_for_platform(platform)
                .await
                .map_err(Self::store_error)?;
            if count as usize >= cap {
                return Err(KeyringError::new(
                    ErrorCode::ValidationError,
                    format!("Maximum number of keys reached for platform: {platform}"),
                )
                .with_details(serde_json::json!({ "limit": cap })));
            }
        }

        let expires_at = expires_at.or_else(|| {
            self.config
                .default_expiration_days
                .map(|days| Utc::now() + Duration::days(days))
        });

        let record = self
            .store
            .insert(NewKeyRecord {
                platform_type: platform,
                key_name: name.to_string(),
                encrypted_key,
                is_active: true,
                expires_at,
                metadata: None,
            })
            .await
            .map_err(Self::store_error)?;

        info!(platform = %platform, key_id = %record.id, "API key added");
        Ok(record)
    }

    /// Replaces a key's secret material in place.
    ///
    /// Id, platform, and name are unchanged; `updated_at` is bumped by the
    /// store.
    pub async fn rotate_key(
        &self,
        key_id: Uuid,
        new_raw_key: &str,
    ) -> Result<KeyRecord, KeyringError> {
        let encrypted_key = self.encrypt_raw_key(new_raw_key)?;

        let record = self
            .store
            .update(
                key_id,
                KeyRecordPatch {
                    encrypted_key: Some(encrypted_key),
                    ..KeyRecordPatch::default()
                },
            )
            .await
            .map_err(Self::store_error)?;

        info!(key_id = %key_id, platform = %record.platform_type, "API key rotated");
        Ok(record)
    }

    /// Soft-deletes a key.
    ///
    /// The record is retained for audit; deactivating an already inactive
    /// key succeeds.
    pub async fn deactivate_key(&self, key_id: Uuid) -> Result<bool, KeyringError> {
        self.store
            .update(
                key_id,
                KeyRecordPatch {
                    is_active: Some(false),
                    ..KeyRecordPatch::default()
                },
            )
            .await
            .map_err(Self::store_error)?;

        info!(key_id = %key_id, "API key deactivated");
        Ok(true)
    }

    /// Lists key records, optionally restricted to one platform.
    ///
    /// Records carry ciphertext only.
    pub async fn list_keys(
        &self,
        platform: Option<PlatformType>,
    ) -> Result<Vec<KeyRecord>, KeyringError> {
        self.store
            .query(KeyQuery {
                platform_type: platform,
                ..KeyQuery::default()
            })
            .await
            .map_err(Self::store_error)
    }

    /// Decrypts and returns the active key for a platform.
    ///
    /// A key at or past its expiration is never served, even while its
    /// activity flag is still set. The plaintext is zeroized once the
    /// caller drops it and is never logged.
    pub async fn get_active_key(
        &self,
        platform: PlatformType,
    ) -> Result<Zeroizing<String>, KeyringError> {
        let records = self
            .store
            .query(KeyQuery {
                platform_type: Some(platform),
                is_active: Some(true),
                limit: Some(1),
            })
            .await
            .map_err(Self::store_error)?;

        let record = records.into_iter().next().ok_or_else(|| {
            KeyringError::new(
                ErrorCode::KeyNotFound,
                format!("No active API key found for platform: {platform}"),
            )
        })?;

        if is_expired(record.expires_at, Utc::now()) {
            return Err(KeyringError::new(
                ErrorCode::KeyExpired,
                format!("API key for platform {platform} has expired"),
            ));
        }

        let plaintext = self
            .engine
            .decrypt(&record.encrypted_key)
            .map_err(|_| KeyringError::new(ErrorCode::DecryptionFailed, "Failed to decrypt API key"))?;

        debug!(platform = %platform, key_id = %record.id, "Active API key decrypted");
        Ok(plaintext)
    }

    /// Compares a presented key against the active stored key.
    ///
    /// Never fails: any lookup or decryption error is folded into an
    /// invalid outcome with the error attached.
    pub async fn validate_key(&self, platform: PlatformType, presented_key: &str) -> KeyValidation {
        match self.get_active_key(platform).await {
            Ok(active_key) => {
                if active_key.as_str() == presented_key {
                    KeyValidation {
                        is_valid: true,
                        error: None,
                    }
                } else {
                    KeyValidation {
                        is_valid: false,
                        error: Some(KeyringError::new(ErrorCode::InvalidKey, "Invalid API key")),
                    }
                }
            }
            Err(error) => KeyValidation {
                is_valid: false,
                error: Some(error),
            },
        }
    }

    /// Checks the configured name length bounds.
    fn validate_key_name(&self, name: &str) -> Result<(), KeyringError> {
        let length = name.chars().count();
        if length < self.config.min_key_name_length || length > self.config.max_key_name_length {
            return Err(KeyringError::new(
                ErrorCode::ValidationError,
                format!(
                    "Key name must be between {} and {} characters",
                    self.config.min_key_name_length, self.config.max_key_name_length
                ),
            ));
        }
        Ok(())
    }

    /// Seals a raw key, mapping engine failures into the taxonomy.
    fn encrypt_raw_key(&self, raw_key: &str) -> Result<String, KeyringError> {
        self.engine.encrypt(raw_key).map_err(|e| {
            KeyringError::new(ErrorCode::EncryptionFailed, "Failed to encrypt API key")
                .with_details(serde_json::json!({ "cause": e.to_string() }))
        })
    }

    /// Maps store failures into the taxonomy.
    fn store_error(err: StoreError) -> KeyringError {
        match err {
            StoreError::NotFound(id) => {
                KeyringError::new(ErrorCode::KeyNotFound, format!("API key not found: {id}"))
            }
            other => KeyringError::new(ErrorCode::DatabaseError, "Database operation failed")
                .with_details(serde_json::json!({ "cause": other.to_string() })),
        }
    }
}

/// Whether a key with the given expiration is expired at `now`.
///
/// A key expiring exactly at `now` is already expired; a key with no
/// expiration never is.
fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.map_or(false, |deadline| deadline <= now)
}
