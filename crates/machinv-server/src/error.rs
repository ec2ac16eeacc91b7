use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use machinv_core::error::{PayloadError, StoreError};

/// Request-level failures. Per-item failures never become an `ApiError`;
/// they travel in the `errors` list of a successful response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid or missing X-Source header. Valid sources: {valid:?}")]
    UnknownSource { valid: Vec<String> },

    #[error("Invalid JSON payload")]
    InvalidJson,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Failed to retrieve data")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownSource { .. } | ApiError::InvalidJson | ApiError::Payload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(err) = &self {
            tracing::error!(error = %err, "record store failure");
        }
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
