//! Search-Summarizer: an HTTP gateway that summarizes web search results
//!
//! A query is sent to a web search provider, the ranked results are
//! formatted into plain text, and a language model summarizes them. The
//! summary is returned as JSON or streamed as chunked plain text.

pub mod config;
pub mod llm;
pub mod network;
pub mod results;
pub mod search;
pub mod summary;
pub mod web;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use llm::{LanguageModel, LlmError};
pub use results::SearchResult;
pub use search::WebSearch;
pub use summary::SummaryTool;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
