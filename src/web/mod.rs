//! Web server module
//!
//! Provides the HTTP gateway: bearer-token auth, the summarize endpoint in
//! buffered and streaming modes, and the interactive API docs.

mod auth;
mod docs;
mod error;
mod handlers;
mod routes;
mod state;
mod templates;


pub use auth::{authenticate, AuthOutcome, ExemptPaths, Rejection};
pub use docs::{openapi_document, route_docs, RouteDoc};
pub use error::ApiError;
pub use handlers::{SearchParams, SummaryResponse};
pub use routes::create_router;
pub use state::AppState;
pub use templates::Templates;
