//! Key store trait definition.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{KeyQuery, KeyRecord, KeyRecordPatch, NewKeyRecord, PlatformType};

/// Storage backend for API key records.
///
/// Backends must return query results newest-first by `created_at`; the
/// first record under that ordering is the one `limit: 1` selection hands
/// to callers when several records match.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Inserts a new record, assigning its id and timestamps.
    async fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError>;

    /// Applies a partial update to the record with the given id and
    /// returns the updated record. Bumps `updated_at`.
    async fn update(&self, id: Uuid, patch: KeyRecordPatch) -> Result<KeyRecord, StoreError>;

    /// Returns records matching the query's equality filters, newest
    /// first, truncated to the query limit.
    async fn query(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, StoreError>;

    /// Counts all records stored for a platform, active or not.
    async fn count_for_platform(&self, platform: PlatformType) -> Result<u64, StoreError> {
        let records = self
            .query(KeyQuery {
                platform_type: Some(platform),
                ..KeyQuery::default()
            })
            .await?;
        Ok(records.len() as u64)
    }
}
