//! HTTP request handlers

use super::error::ApiError;
use super::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Query parameters for `/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    /// `"true"` selects a streamed plain-text response
    pub stream: Option<String>,
}

impl SearchParams {
    fn streaming(&self) -> bool {
        self.stream.as_deref() == Some("true")
    }
}

/// Buffered `/search` response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Health check handler
pub async fn index() -> &'static str {
    "Ok"
}

/// Search-and-summarize handler
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return Err(ApiError::MissingQuery),
    };

    if params.streaming() {
        info!("Streaming summary for '{}'", query);
        let fragments = state.summarizer.summarize_stream(&query).await?;

        // One body frame per fragment; an error after the first frame
        // aborts the transfer instead of ending it cleanly.
        let body = Body::from_stream(
            fragments.inspect_err(|e| error!("Summary stream failed mid-response: {}", e)),
        );
        return Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            body,
        )
            .into_response());
    }

    info!("Summarizing '{}'", query);
    let summary = state.summarizer.summarize(&query).await?;
    Ok(Json(SummaryResponse { summary }).into_response())
}

/// Interactive API documentation
pub async fn api_docs(State(state): State<AppState>) -> impl IntoResponse {
    Html(state.docs_page.to_string())
}

/// Fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
