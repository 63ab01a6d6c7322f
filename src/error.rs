//! Errors surfaced to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::ModelError;
use crate::validator::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The body is not a decodable JSON object. The validator never ran.
    #[error("Failed to decode JSON object: {0}")]
    Decode(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Model inference failed: {0}")]
    ModelInference(#[from] ModelError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::ModelInference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every non-200 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    #[schema(example = "400 - Bad Request")]
    pub status_code: String,
    #[schema(example = "Failed to decode JSON object: No key/value pair in JSON. Expecting one, with key of 'sentence'.")]
    pub error_message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            status_code: format!("{} - {}", status.as_u16(), status.canonical_reason().unwrap_or("Error")),
            error_message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::ModelInference(e) => tracing::error!(error = %e, "prediction failed"),
            _ => tracing::info!(reason = %self, "request rejected"),
        }
        (status, Json(ErrorResponse::new(status, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = ApiError::from(ValidationError::WrongKey);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), ValidationError::WrongKey.to_string());
    }

    #[test]
    fn test_status_code_text() {
        let body = ErrorResponse::new(StatusCode::BAD_REQUEST, "x");
        assert_eq!(body.status_code, "400 - Bad Request");
        let body = ErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "x");
        assert_eq!(body.status_code, "500 - Internal Server Error");
    }

    #[test]
    fn test_inference_failure_is_server_error() {
        let err = ApiError::from(ModelError::FeatureOutOfRange { index: 3, width: 1 });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Model inference failed"));
    }
}
