use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use gateway_core::{ErrorKind, GatewayError};

/// Encode a [`GatewayError`] as its HTTP status and JSON error body.
pub fn error_to_response(err: GatewayError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(err.kind().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match err.kind() {
        ErrorKind::Internal | ErrorKind::DeadlineExceeded => {
            tracing::error!(error = %err, kind = err.kind().as_str(), "operation failed");
        }
        _ => tracing::debug!(error = %err, kind = err.kind().as_str(), "operation rejected"),
    }

    (status, axum::Json(err.to_body())).into_response()
}

/// Malformed or missing JSON bodies are argument errors like any other.
pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    error_to_response(GatewayError::invalid_argument(rejection.body_text()))
}
