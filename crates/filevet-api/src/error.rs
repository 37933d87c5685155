//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; `AppError`
//! values convert via `?` and render consistently (status, JSON body,
//! logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use filevet_core::AppError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: &'static str,
}

/// Wrapper type for AppError to implement IntoResponse. Necessary because of
/// Rust's orphan rules: IntoResponse is an external trait and AppError lives
/// in filevet-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        AppError::Infected(_) => (StatusCode::CONFLICT, "FILE_INFECTED"),
        AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        AppError::External(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
        AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "Request failed");
        } else {
            tracing::debug!(error = %self.0, code, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_status_codes() {
        let cases = [
            (AppError::NotFound("f1".into()), StatusCode::NOT_FOUND),
            (AppError::Timeout("scan".into()), StatusCode::GATEWAY_TIMEOUT),
            (AppError::Infected("f1".into()), StatusCode::CONFLICT),
            (
                AppError::Config("RENDER_SERVICE_URL".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::External("validator".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(status_and_code(&err).0, expected);
        }
    }
}
