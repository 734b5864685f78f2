//! Result type definitions

use serde::{Deserialize, Serialize};

/// A single web search hit, in provider rank order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// The title of the result
    pub title: String,
    /// Snippet text; may contain inline HTML emphasis
    pub description: String,
    /// The URL of the result
    pub url: String,
}

impl SearchResult {
    /// Create a new result
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }
}
