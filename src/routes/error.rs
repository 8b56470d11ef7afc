// src/routes/error.rs
//! HTTP error mapping.
//!
//! Handlers return [`AppError`], which renders a JSON body
//! `{"error": <message>, "code": <CODE>}` with a status matching the
//! failure class. Upstream feed failures are server errors (502) with
//! distinct codes; database faults are logged and hidden behind a generic 500.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::Error;

#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

// Extractor rejections use the same envelope as handler errors.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self(Error::Validation(rejection.body_text()))
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let (status, code, message) = match &self.0 {
            Error::Network(_) => {
                tracing::warn!(error = %self.0, "Weather feed unavailable");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE", self.0.to_string())
            }
            Error::DataFormat(_) => {
                tracing::warn!(error = %self.0, "Weather feed returned unexpected data");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_DATA_FORMAT", self.0.to_string())
            }
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Error::DuplicateReading { .. } => (StatusCode::CONFLICT, "DUPLICATE_READING", self.0.to_string()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.0.to_string()),
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.0.to_string()),
            Error::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
