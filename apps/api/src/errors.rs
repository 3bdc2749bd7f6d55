#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::TransportFailure;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Remote-model and network failures are expected here, not exceptional:
/// every variant renders a visible inline message and leaves the session
/// usable for an immediate retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No evaluation in session")]
    NoEvaluation,

    #[error("Completion failed: {0}")]
    Upstream(#[from] TransportFailure),

    #[error("Malformed judgment response: {0}")]
    MalformedJudgment(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoEvaluation => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_EVALUATION",
                "Run an analysis before requesting an optimization".to_string(),
            ),
            AppError::Upstream(failure) => {
                tracing::warn!("completion failed: {failure}");
                // Status code and body of the remote error are surfaced
                // verbatim via TransportFailure's Display impl.
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    failure.to_string(),
                )
            }
            AppError::MalformedJudgment(e) => {
                tracing::warn!("judgment response was not valid JSON: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_JUDGMENT",
                    format!("The model did not return valid JSON: {e}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_message_carries_status_and_body() {
        let err = AppError::Upstream(TransportFailure::Status {
            status: 500,
            body: "server error".to_string(),
        });
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("server error"));
    }

    #[test]
    fn upstream_errors_map_to_bad_gateway() {
        let response = AppError::Upstream(TransportFailure::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response = AppError::Validation("description cannot be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_evaluation_maps_to_unprocessable_entity() {
        let response = AppError::NoEvaluation.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
