//! Summarization pipeline
//!
//! Search, format, then generate.

mod tool;

pub use tool::{SummaryTool, NO_RESULTS_CONTEXT};
