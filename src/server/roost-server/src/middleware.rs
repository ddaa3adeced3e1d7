//! Key validation middleware.
//!
//! Gates inbound requests that must present a platform API key. There is
//! no caching: every request re-validates against the service and so
//! re-decrypts the stored key.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use roost_keyring::{ApiKeyService, PlatformType};

/// Request header carrying the presented API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware state: the service plus the platform this gate protects.
#[derive(Clone)]
pub struct KeyGate {
    /// The key lifecycle service.
    pub keyring: Arc<ApiKeyService>,
    /// Platform whose active key callers must present.
    pub platform: PlatformType,
}

/// Rejects requests that do not present the platform's active API key.
///
/// - missing header: `401 {"error": "API key is required"}`
/// - credential rejected (wrong, unknown, or expired key): `401` with the
///   validation error message
/// - validation machinery failed (store, decryption): `500
///   {"error": "Error validating API key"}`
/// - valid key: pass through unchanged
pub async fn require_api_key(State(gate): State<KeyGate>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(presented) = presented else {
        return unauthorized("API key is required");
    };

    let outcome = gate.keyring.validate_key(gate.platform, presented).await;
    if outcome.is_valid {
        return next.run(req).await;
    }

    match outcome.error {
        Some(error) if error.code.is_infrastructure() => {
            warn!(platform = %gate.platform, code = %error.code, "API key validation failed");
            server_error()
        }
        Some(error) => unauthorized(&error.message),
        None => unauthorized("Invalid API key"),
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Error validating API key" })),
    )
        .into_response()
}
