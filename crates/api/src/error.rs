//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sample failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error("Threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": self.to_string(), "details": errors }),
            ),
            ApiError::InvalidThreshold(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
