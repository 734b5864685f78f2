use serde::Deserialize;
use thiserror::Error;

/// Failure talking to a language-model backend
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Backend returned no content")]
    EmptyResponse,
}

impl LlmError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Build an API error from a non-success response body, unwrapping the
    /// `{"error": {"message": ...}}` or `{"error": "..."}` envelopes.
    pub fn from_status(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: ErrorDetail,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ErrorDetail {
            Object { message: String },
            Text(String),
        }

        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse {
                error: ErrorDetail::Object { message },
            })
            | Ok(ErrorResponse {
                error: ErrorDetail::Text(message),
            }) => Self::api(status, message),
            Err(_) => Self::api(status, body.trim()),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}
