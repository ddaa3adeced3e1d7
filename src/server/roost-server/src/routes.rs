//! Management API routes and router assembly.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use roost_keyring::{KeyRecord, PlatformType};

use crate::error::ApiError;
use crate::middleware::{require_api_key, KeyGate};
use crate::state::AppState;

/// Request body for adding a key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddKeyRequest {
    /// Platform the credential authenticates to.
    pub platform: PlatformType,
    /// The raw secret; encrypted before it reaches storage.
    pub key: String,
    /// Human-readable label.
    pub name: String,
    /// Optional expiration timestamp.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for rotating a key.
#[derive(Debug, Deserialize)]
pub struct RotateKeyRequest {
    /// The replacement raw secret.
    pub key: String,
}

/// Query parameters for listing keys.
#[derive(Debug, Deserialize)]
pub struct ListKeysQuery {
    /// Restrict the listing to one platform.
    pub platform: Option<PlatformType>,
}

/// Response body for a deactivation.
#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    /// Always true on success; deactivation is idempotent.
    pub deactivated: bool,
}

/// Health probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
}

/// Request body for the gated ingest endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestPostRequest {
    /// Post content to queue.
    pub content: String,
    /// When the post should go out; immediate when absent.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Response body for the gated ingest endpoint.
#[derive(Debug, Serialize)]
pub struct IngestPostResponse {
    /// Whether the draft was queued.
    pub queued: bool,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn add_key(
    State(state): State<AppState>,
    Json(req): Json<AddKeyRequest>,
) -> Result<(StatusCode, Json<KeyRecord>), ApiError> {
    let record = state
        .keyring
        .add_key(req.platform, &req.key, &req.name, req.expires_at)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_keys(
    State(state): State<AppState>,
    Query(query): Query<ListKeysQuery>,
) -> Result<Json<Vec<KeyRecord>>, ApiError> {
    let records = state.keyring.list_keys(query.platform).await?;
    Ok(Json(records))
}

async fn rotate_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RotateKeyRequest>,
) -> Result<Json<KeyRecord>, ApiError> {
    let record = state.keyring.rotate_key(id, &req.key).await?;
    Ok(Json(record))
}

async fn deactivate_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeactivateResponse>, ApiError> {
    let deactivated = state.keyring.deactivate_key(id).await?;
    Ok(Json(DeactivateResponse { deactivated }))
}

/// Accepts a post draft pushed by an external automation.
///
/// The draft only reaches this handler once the middleware has validated
/// the platform API key; the post pipeline itself lives elsewhere.
async fn ingest_post(
    State(gate): State<KeyGate>,
    Json(req): Json<IngestPostRequest>,
) -> (StatusCode, Json<IngestPostResponse>) {
    info!(
        platform = %gate.platform,
        scheduled_at = ?req.scheduled_at,
        content_length = req.content.len(),
        "Post draft accepted"
    );
    (StatusCode::ACCEPTED, Json(IngestPostResponse { queued: true }))
}

/// Builds the full application router.
///
/// `/v1/keys` is the management surface; `/v1/ingest/{platform}/posts` is
/// gated per platform by [`require_api_key`].
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/v1/sys/health", get(health))
        .route("/v1/keys", post(add_key).get(list_keys))
        .route("/v1/keys/{id}/rotate", post(rotate_key))
        .route("/v1/keys/{id}", delete(deactivate_key))
        .with_state(state.clone());

    for platform in PlatformType::ALL {
        let gate = KeyGate {
            keyring: state.keyring.clone(),
            platform,
        };
        app = app.nest(
            &format!("/v1/ingest/{platform}"),
            Router::new()
                .route("/posts", post(ingest_post))
                .route_layer(axum::middleware::from_fn_with_state(
                    gate.clone(),
                    require_api_key,
                ))
                .with_state(gate),
        );
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
