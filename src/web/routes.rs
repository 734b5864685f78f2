//! Route definitions

use super::auth;
use super::handlers;
use super::state::AppState;
use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/search", get(handlers::search))
        .route("/api-docs", get(handlers::api_docs))
        .fallback(handlers::not_found)
        // Auth runs inside tracing and CORS so preflights are answered unauthenticated
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
