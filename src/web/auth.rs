//! Bearer-token gate in front of every non-exempt route

use super::error::ApiError;
use super::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;

const BEARER_PREFIX: &str = "Bearer ";

/// Paths served without authentication
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    paths: HashSet<String>,
}

impl ExemptPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact path membership; no prefix matching
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl Default for ExemptPaths {
    fn default() -> Self {
        Self::new(["/", "/api-docs"])
    }
}

/// Result of checking one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Exempt,
    Verified,
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Header absent, not valid text, or not a bearer token
    MissingOrMalformed,
    /// Bearer token does not match the configured secret
    InvalidToken,
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingOrMalformed => ApiError::Unauthorized,
            Rejection::InvalidToken => ApiError::Forbidden,
        }
    }
}

/// Decide whether a request to `path` carrying `authorization` may proceed
pub fn authenticate(
    path: &str,
    authorization: Option<&str>,
    exempt: &ExemptPaths,
    secret: &str,
) -> AuthOutcome {
    if exempt.contains(path) {
        return AuthOutcome::Exempt;
    }

    let token = match authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) {
        Some(token) => token.trim(),
        None => return AuthOutcome::Rejected(Rejection::MissingOrMalformed),
    };

    if token == secret {
        AuthOutcome::Verified
    } else {
        AuthOutcome::Rejected(Rejection::InvalidToken)
    }
}

/// Middleware enforcing [`authenticate`] on every request
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match authenticate(
        request.uri().path(),
        authorization,
        &state.exempt_paths,
        state.api_key(),
    ) {
        AuthOutcome::Exempt | AuthOutcome::Verified => next.run(request).await,
        AuthOutcome::Rejected(rejection) => {
            tracing::debug!("Rejected {} request: {:?}", request.uri().path(), rejection);
            ApiError::from(rejection).into_response()
        }
    }
}
