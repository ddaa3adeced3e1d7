//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use roost_keyring::{ErrorCode, KeyringError};

/// A keyring failure rendered as an HTTP response.
///
/// The body is `{"error": {"code", "message", "details"?}}`.
#[derive(Debug)]
pub struct ApiError(pub KeyringError);

impl From<KeyringError> for ApiError {
    fn from(err: KeyringError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::KeyNotFound | ErrorCode::KeyExpired => StatusCode::NOT_FOUND,
            ErrorCode::InvalidKey => StatusCode::UNAUTHORIZED,
            ErrorCode::EncryptionFailed
            | ErrorCode::DecryptionFailed
            | ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0 }))).into_response()
    }
}
