use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::formalizer::PipelineError;
use crate::reports::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(e) => {
                tracing::error!("Pipeline error: {e:?}");
                let (status, code) = match e {
                    PipelineError::Configuration => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                    }
                    PipelineError::ServiceOverloaded => {
                        (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_OVERLOADED")
                    }
                    PipelineError::InvalidCredential => {
                        (StatusCode::BAD_GATEWAY, "INVALID_CREDENTIAL")
                    }
                    PipelineError::GenerationFailed => {
                        (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "The reports could not be read or written".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
