//! Search-then-summarize tool

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::llm::{FragmentStream, LanguageModel, LlmError, Prompt};
use crate::results::format_results_limited;
use crate::search::WebSearch;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Context handed to the model when the search produced nothing usable
pub const NO_RESULTS_CONTEXT: &str = "No search results were found for this query.";

/// Runs a web search and asks a language model to summarize the results.
///
/// Each call performs exactly one search and one generation request.
/// Search failures degrade to [`NO_RESULTS_CONTEXT`]; generation failures
/// are returned to the caller.
pub struct SummaryTool {
    search: Arc<dyn WebSearch>,
    model: Arc<dyn LanguageModel>,
    system_prompt: String,
    max_results: usize,
}

impl SummaryTool {
    pub fn new(search: Arc<dyn WebSearch>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            search,
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_results: usize::MAX,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Summarize `query`, returning the complete text
    pub async fn summarize(&self, query: &str) -> Result<String, LlmError> {
        let prompt = self.build_prompt(query).await;
        self.model.complete(&prompt).await
    }

    /// Summarize `query`, yielding fragments as the backend produces them.
    ///
    /// The stream is not restartable; calling again re-runs the search.
    pub async fn summarize_stream(&self, query: &str) -> Result<FragmentStream, LlmError> {
        let prompt = self.build_prompt(query).await;
        self.model.stream(&prompt).await
    }

    async fn build_prompt(&self, query: &str) -> Prompt {
        let results = self.search.search(query, &BTreeMap::new()).await;

        let context = match results {
            Some(results) if !results.is_empty() => {
                info!(
                    "Summarizing '{}' from {} {} results with {}",
                    query,
                    results.len(),
                    self.search.name(),
                    self.model.name()
                );
                format_results_limited(&results, self.max_results)
            }
            Some(_) => {
                info!("No {} results for '{}'", self.search.name(), query);
                NO_RESULTS_CONTEXT.to_string()
            }
            None => {
                warn!(
                    "Search unavailable for '{}', summarizing without results",
                    query
                );
                NO_RESULTS_CONTEXT.to_string()
            }
        };

        Prompt::new(self.system_prompt.clone(), user_message(query, &context))
    }
}

fn user_message(query: &str, context: &str) -> String {
    format!(
        "Search query: {}\n\nSearch results:\n{}\n\nSummarize these results as an answer to the query.",
        query, context
    )
}
