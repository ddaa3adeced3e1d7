//! API key record model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// External platform a stored credential authenticates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Twitter / X posting API.
    Twitter,
    /// LinkedIn posting API.
    Linkedin,
    /// OpenAI API (caption and hashtag generation).
    Openai,
}

impl PlatformType {
    /// All supported platforms.
    pub const ALL: [PlatformType; 3] = [
        PlatformType::Twitter,
        PlatformType::Linkedin,
        PlatformType::Openai,
    ];

    /// Wire / storage name of the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Twitter => "twitter",
            PlatformType::Linkedin => "linkedin",
            PlatformType::Openai => "openai",
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized platform name.
#[derive(Debug, Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformType {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(PlatformType::Twitter),
            "linkedin" => Ok(PlatformType::Linkedin),
            "openai" => Ok(PlatformType::Openai),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// A persisted API key record.
///
/// `encrypted_key` is always engine output; the raw secret never reaches
/// the store. Records are soft-deleted via `is_active` and never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Platform this credential authenticates to.
    pub platform_type: PlatformType,
    /// Human-readable label.
    pub key_name: String,
    /// Ciphertext envelope of the raw secret.
    pub encrypted_key: String,
    /// Whether the key is eligible to serve traffic.
    pub is_active: bool,
    /// Expiration timestamp; `None` means the key never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form metadata (e.g. last-used timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp, maintained by the store.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, maintained by the store.
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for a new key record.
///
/// Id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewKeyRecord {
    /// Platform the credential authenticates to.
    pub platform_type: PlatformType,
    /// Human-readable label.
    pub key_name: String,
    /// Ciphertext envelope of the raw secret.
    pub encrypted_key: String,
    /// Initial activity flag.
    pub is_active: bool,
    /// Optional expiration timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional free-form metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Partial update for an existing record.
///
/// Unset fields are left untouched; the store bumps `updated_at` on every
/// applied patch.
#[derive(Debug, Clone, Default)]
pub struct KeyRecordPatch {
    /// Replacement ciphertext (key rotation).
    pub encrypted_key: Option<String>,
    /// New activity flag (deactivation).
    pub is_active: Option<bool>,
    /// Replacement metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Equality filters and an optional result limit for record queries.
#[derive(Debug, Clone, Default)]
pub struct KeyQuery {
    /// Restrict to one platform.
    pub platform_type: Option<PlatformType>,
    /// Restrict by activity flag.
    pub is_active: Option<bool>,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl KeyQuery {
    /// Query selecting the active records for a platform.
    pub fn active_for(platform: PlatformType) -> Self {
        Self {
            platform_type: Some(platform),
            is_active: Some(true),
            limit: None,
        }
    }
}
