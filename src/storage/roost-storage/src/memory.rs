//! In-memory key store.
//!
//! Backs unit tests and dev-mode runs. Insertion order doubles as the
//! recency tie-break when several records share a creation timestamp.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{KeyQuery, KeyRecord, KeyRecordPatch, NewKeyRecord};
use crate::store::KeyStore;

/// Key store holding all records in process memory.
#[derive(Default)]
pub struct MemoryKeyStore {
    records: RwLock<Vec<KeyRecord>>,
}

impl MemoryKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError> {
        let now = Utc::now();
        let record = KeyRecord {
            id: Uuid::new_v4(),
            platform_type: record.platform_type,
            key_name: record.key_name,
            encrypted_key: record.encrypted_key,
            is_active: record.is_active,
            expires_at: record.expires_at,
            metadata: record.metadata,
            created_at: now,
            updated_at: now,
        };

        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: KeyRecordPatch) -> Result<KeyRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(encrypted_key) = patch.encrypted_key {
            record.encrypted_key = encrypted_key;
        }
        if let Some(is_active) = patch.is_active {
            record.is_active = is_active;
        }
        if let Some(metadata) = patch.metadata {
            record.metadata = Some(metadata);
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn query(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, StoreError> {
        let records = self.records.read().await;

        // Reverse insertion order first so the stable sort keeps the most
        // recently inserted record in front on timestamp ties.
        let mut matches: Vec<KeyRecord> = records
            .iter()
            .rev()
            .filter(|r| {
                query
                    .platform_type
                    .map_or(true, |p| r.platform_type == p)
                    && query.is_active.map_or(true, |a| r.is_active == a)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(limit) = query.limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }
}
