//! Integration tests for the Roost credential service.
//!
//! These run the full stack - keyring service, encryption engine, and the
//! SQLite store - against temporary data directories, and drive the HTTP
//! router in-process.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::path::Path;
use std::sync::Arc;

use roost_crypto::{EncryptionEngine, MasterKey};
use roost_keyring::ApiKeyService;
use roost_storage_sqlite::SqliteKeyStore;

/// Opens a keyring service over a SQLite store in `data_dir`.
pub async fn open_service(data_dir: &Path, master_key: &str) -> Arc<ApiKeyService> {
    let store = SqliteKeyStore::open(data_dir)
        .await
        .expect("failed to open key store");
    let engine = EncryptionEngine::new(MasterKey::new(master_key).expect("invalid master key"));
    Arc::new(ApiKeyService::new(Arc::new(store), engine))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use roost_keyring::{ErrorCode, PlatformType};
    use roost_server::{router, AppState};
    use roost_storage::{KeyRecordPatch, KeyStore};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_full_key_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let service = open_service(tmp.path(), "lifecycle-master").await;

        // Create
        let record = service
            .add_key(PlatformType::Twitter, "v1-secret", "Prod Twitter", None)
            .await
            .unwrap();
        assert!(record.is_active);
        assert_ne!(record.encrypted_key, "v1-secret");

        // Serve
        let active = service.get_active_key(PlatformType::Twitter).await.unwrap();
        assert_eq!(active.as_str(), "v1-secret");

        // Rotate in place
        let rotated = service.rotate_key(record.id, "v2-secret").await.unwrap();
        assert_eq!(rotated.id, record.id);
        let active = service.get_active_key(PlatformType::Twitter).await.unwrap();
        assert_eq!(active.as_str(), "v2-secret");

        // Deactivate (terminal)
        assert!(service.deactivate_key(record.id).await.unwrap());
        let err = service
            .get_active_key(PlatformType::Twitter)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::KeyNotFound);

        // The record is kept for audit.
        let all = service.list_keys(Some(PlatformType::Twitter)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);
    }

    #[tokio::test]
    async fn test_expired_key_not_served() {
        let tmp = TempDir::new().unwrap();
        let service = open_service(tmp.path(), "expiry-master").await;

        service
            .add_key(
                PlatformType::Openai,
                "sk-stale",
                "Stale Key",
                Some(Utc::now() - Duration::minutes(5)),
            )
            .await
            .unwrap();

        let err = service
            .get_active_key(PlatformType::Openai)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::KeyExpired);

        let outcome = service.validate_key(PlatformType::Openai, "sk-stale").await;
        assert!(!outcome.is_valid);
        assert_eq!(outcome.error.unwrap().code, ErrorCode::KeyExpired);
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let tmp = TempDir::new().unwrap();

        {
            let service = open_service(tmp.path(), "durable-master").await;
            service
                .add_key(PlatformType::Linkedin, "li-secret", "LinkedIn Key", None)
                .await
                .unwrap();
        }

        // Same directory and master key: the stored envelope still opens.
        let service = open_service(tmp.path(), "durable-master").await;
        let active = service
            .get_active_key(PlatformType::Linkedin)
            .await
            .unwrap();
        assert_eq!(active.as_str(), "li-secret");
    }

    #[tokio::test]
    async fn test_wrong_master_key_on_reopen() {
        let tmp = TempDir::new().unwrap();

        {
            let service = open_service(tmp.path(), "first-master").await;
            service
                .add_key(PlatformType::Twitter, "tw-secret", "Twitter Key", None)
                .await
                .unwrap();
        }

        // Records survive, but the envelope no longer opens.
        let service = open_service(tmp.path(), "second-master").await;
        let records = service.list_keys(Some(PlatformType::Twitter)).await.unwrap();
        assert_eq!(records.len(), 1);

        let err = service
            .get_active_key(PlatformType::Twitter)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DecryptionFailed);
    }

    #[tokio::test]
    async fn test_master_key_rotation_workflow() {
        let tmp = TempDir::new().unwrap();

        let old_engine = EncryptionEngine::new(MasterKey::new("old-master").unwrap());
        let store = Arc::new(SqliteKeyStore::open(tmp.path()).await.unwrap());
        let service = Arc::new(ApiKeyService::new(
            store.clone() as Arc<dyn KeyStore>,
            old_engine.clone(),
        ));

        let record = service
            .add_key(PlatformType::Openai, "sk-live", "Caption Bot", None)
            .await
            .unwrap();

        // Re-encrypt the stored envelope under the new master key. Walking
        // the store is the operator's job; the engine only rewraps one
        // envelope at a time.
        let rewrapped = old_engine
            .rotate_master_key(&record.encrypted_key, MasterKey::new("new-master").unwrap())
            .unwrap();
        store
            .update(
                record.id,
                KeyRecordPatch {
                    encrypted_key: Some(rewrapped),
                    ..KeyRecordPatch::default()
                },
            )
            .await
            .unwrap();

        // A service booted with the new master key serves the same secret.
        let service = open_service(tmp.path(), "new-master").await;
        let active = service.get_active_key(PlatformType::Openai).await.unwrap();
        assert_eq!(active.as_str(), "sk-live");
    }

    #[tokio::test]
    async fn test_http_management_and_ingest_flow() {
        let tmp = TempDir::new().unwrap();
        let service = open_service(tmp.path(), "http-master").await;
        let app: Router = router(AppState::new(service));

        // Provision a key over HTTP.
        let created = app
            .clone()
            .oneshot(
                Request::post("/v1/keys")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "platform": "twitter",
                            "key": "tw-live-key",
                            "name": "Growth Account"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let record = body_json(created).await;
        assert_ne!(record["encryptedKey"], "tw-live-key");

        // The gated ingest endpoint rejects a missing key...
        let denied = app
            .clone()
            .oneshot(
                Request::post("/v1/ingest/twitter/posts")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"content": "launch day"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(denied).await["error"], "API key is required");

        // ...and accepts the provisioned one.
        let accepted = app
            .clone()
            .oneshot(
                Request::post("/v1/ingest/twitter/posts")
                    .header("content-type", "application/json")
                    .header("x-api-key", "tw-live-key")
                    .body(Body::from(json!({"content": "launch day"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(accepted.status(), StatusCode::ACCEPTED);

        // Deactivate over HTTP; the gate closes.
        let id = record["id"].as_str().unwrap();
        let deleted = app
            .clone()
            .oneshot(
                Request::delete(format!("/v1/keys/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::OK);

        let closed = app
            .oneshot(
                Request::post("/v1/ingest/twitter/posts")
                    .header("content-type", "application/json")
                    .header("x-api-key", "tw-live-key")
                    .body(Body::from(json!({"content": "late post"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(closed.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_ciphertexts_differ_for_identical_secrets() {
        let tmp = TempDir::new().unwrap();
        let service = open_service(tmp.path(), "entropy-master").await;

        let first = service
            .add_key(PlatformType::Twitter, "same-secret", "Key One", None)
            .await
            .unwrap();
        let second = service
            .add_key(PlatformType::Twitter, "same-secret", "Key Two", None)
            .await
            .unwrap();

        assert_ne!(first.encrypted_key, second.encrypted_key);
    }
}
