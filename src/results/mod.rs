//! Search result types and formatting
//!
//! Turns ranked provider hits into the plain-text context handed to the
//! language model.

mod formatter;
mod types;

pub use formatter::{clean_text, format_results, format_results_limited};
pub use types::SearchResult;
