//! # Roost Storage - SQLite Backend
//!
//! SQLite implementation of the key record store. One database file per
//! data directory; the schema is created on open.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use tracing::{debug, info};
use uuid::Uuid;

use roost_storage::record::UnknownPlatform;
use roost_storage::{
    KeyQuery, KeyRecord, KeyRecordPatch, KeyStore, NewKeyRecord, PlatformType, StoreError,
};

/// Name of the database file inside the data directory.
const DB_FILE: &str = "keys.db";

/// Columns selected for record mapping, in [`KeyRow`] order.
const RECORD_COLUMNS: &str = "id, platform_type, key_name, encrypted_key, is_active, expires_at, metadata, created_at, updated_at";

/// Raw row shape as stored in SQLite.
type KeyRow = (
    String,         // id
    String,         // platform_type
    String,         // key_name
    String,         // encrypted_key
    bool,           // is_active
    Option<String>, // expires_at
    Option<String>, // metadata
    String,         // created_at
    String,         // updated_at
);

/// SQLite-backed key record store.
#[derive(Clone)]
pub struct SqliteKeyStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteKeyStore {
    /// Opens or creates the key database under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// connection fails, or the schema migration fails.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base = data_dir.as_ref();
        std::fs::create_dir_all(base)
            .map_err(|e| StoreError::Connection(format!("failed to create directory: {e}")))?;

        let db_path = base.join(DB_FILE);
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(path = %db_path.display(), "Opening key database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool, db_path };
        store.migrate().await?;

        info!("SQLite key store ready");

        Ok(store)
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StoreError> {
        debug!("Running key store migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                id            TEXT PRIMARY KEY,
                platform_type TEXT NOT NULL,
                key_name      TEXT NOT NULL,
                encrypted_key TEXT NOT NULL,
                is_active     INTEGER NOT NULL DEFAULT 1,
                expires_at    TEXT,
                metadata      TEXT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(format!("migration failed: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_api_keys_platform_active ON api_keys (platform_type, is_active)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Connection(format!("migration failed: {e}")))?;

        Ok(())
    }

    /// Fetches one record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<KeyRecord>, StoreError> {
        let row: Option<KeyRow> = sqlx::query_as(&format!(
            "SELECT {RECORD_COLUMNS} FROM api_keys WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(map_row).transpose()
    }
}

#[async_trait]
impl KeyStore for SqliteKeyStore {
    async fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let metadata_json = record
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Serialization(format!("metadata: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO api_keys (id, platform_type, key_name, encrypted_key, is_active, expires_at, metadata, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(record.platform_type.as_str())
        .bind(&record.key_name)
        .bind(&record.encrypted_key)
        .bind(record.is_active)
        .bind(record.expires_at.map(format_timestamp))
        .bind(metadata_json)
        .bind(format_timestamp(now))
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(KeyRecord {
            id,
            platform_type: record.platform_type,
            key_name: record.key_name,
            encrypted_key: record.encrypted_key,
            is_active: record.is_active,
            expires_at: record.expires_at,
            metadata: record.metadata,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: Uuid, patch: KeyRecordPatch) -> Result<KeyRecord, StoreError> {
        let mut record = self.fetch(id).await?.ok_or(StoreError::NotFound(id))?;

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

        let metadata_json = record
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Serialization(format!("metadata: {e}")))?;

        sqlx::query(
            "UPDATE api_keys SET encrypted_key = ?, is_active = ?, metadata = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&record.encrypted_key)
        .bind(record.is_active)
        .bind(metadata_json)
        .bind(format_timestamp(record.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(record)
    }

    async fn query(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, StoreError> {
        let mut builder = QueryBuilder::new(format!("SELECT {RECORD_COLUMNS} FROM api_keys"));

        let mut prefix = " WHERE ";
        if let Some(platform) = query.platform_type {
            builder.push(prefix).push("platform_type = ");
            builder.push_bind(platform.as_str());
            prefix = " AND ";
        }
        if let Some(is_active) = query.is_active {
            builder.push(prefix).push("is_active = ");
            builder.push_bind(is_active);
        }

        // Fixed-width timestamps sort chronologically; rowid breaks ties
        // by insertion recency.
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }

        let rows: Vec<KeyRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.into_iter().map(map_row).collect()
    }

    async fn count_for_platform(&self, platform: PlatformType) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE platform_type = ?")
                .bind(platform.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

/// Maps a raw row onto the record model.
fn map_row(row: KeyRow) -> Result<KeyRecord, StoreError> {
    let (id, platform_type, key_name, encrypted_key, is_active, expires_at, metadata, created_at, updated_at) =
        row;

    let id = Uuid::parse_str(&id).map_err(|e| StoreError::Serialization(format!("id: {e}")))?;
    let platform_type = platform_type
        .parse()
        .map_err(|e: UnknownPlatform| StoreError::Serialization(e.to_string()))?;
    let expires_at = expires_at.as_deref().map(parse_timestamp).transpose()?;
    let metadata = metadata
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| StoreError::Serialization(format!("metadata: {e}")))?;

    Ok(KeyRecord {
        id,
        platform_type,
        key_name,
        encrypted_key,
        is_active,
        expires_at,
        metadata,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Formats a timestamp as fixed-width RFC 3339 (microseconds, Z suffix).
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored RFC 3339 timestamp.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(format!("timestamp: {e}")))
}
