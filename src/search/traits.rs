//! Search provider trait

use crate::results::SearchResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A web search provider.
///
/// `None` is the only failure signal: the provider was unreachable, answered
/// with an error status or returned a body that could not be understood.
/// Callers treat it as "no results available" and do not retry.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Run a search; `extra_params` are sent after the query and override
    /// configured defaults of the same name.
    async fn search(
        &self,
        query: &str,
        extra_params: &BTreeMap<String, String>,
    ) -> Option<Vec<SearchResult>>;
}
