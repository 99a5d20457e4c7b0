// src/errors.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Location errors
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Outside {location}: {distance_meters} m from the office (allowed {radius_meters} m)")]
    LocationOutOfRange {
        distance_meters: u64,
        radius_meters: f64,
        location: String,
    },

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::LocationUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LocationOutOfRange { .. } => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        // The attendance UI renders the measured distance next to the verdict.
        if let AppError::LocationOutOfRange {
            distance_meters, ..
        } = &self
        {
            body["error"]["distance_meters"] = json!(distance_meters);
        }
        (status, Json(body)).into_response()
    }
}

// Convenience alias
pub type AppResult<T> = Result<T, AppError>;
