//! Error responses rendered by the gateway

use crate::llm::LlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request failures, each rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// `Authorization` header absent or not a bearer token
    #[error("Missing or invalid API key")]
    Unauthorized,

    /// Bearer token present but does not match the configured secret
    #[error("Invalid API key")]
    Forbidden,

    #[error("Missing search query")]
    MissingQuery,

    #[error("Not found")]
    NotFound,

    #[error("Summary generation failed: {0}")]
    Generation(#[from] LlmError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Generation(ref e) = self {
            tracing::error!("Summary generation failed: {}", e);
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::MissingQuery.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(LlmError::EmptyResponse).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
