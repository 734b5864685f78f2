//! HTTP networking module
//!
//! Provides the outbound HTTP client shared by the search provider and the
//! language-model backends.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{HttpMethod, OutboundRequest, OutboundResponse};
