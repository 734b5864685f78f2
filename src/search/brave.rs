//! Brave Search API client

use super::traits::WebSearch;
use crate::config::SearchSettings;
use crate::network::{HttpClient, OutboundRequest};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Brave web search, authenticated with a subscription token
pub struct BraveSearch {
    client: HttpClient,
    base_url: String,
    api_key: String,
    count: u32,
    default_params: BTreeMap<String, String>,
}

impl BraveSearch {
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self::from_settings(client, &SearchSettings::default(), api_key)
    }

    /// Build from the search settings; the credential is passed separately
    /// because settings validation guarantees it exists.
    pub fn from_settings(
        client: HttpClient,
        settings: &SearchSettings,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: api_key.into(),
            count: settings.count,
            default_params: settings.extra_params.clone(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, query: &str, extra_params: &BTreeMap<String, String>) -> OutboundRequest {
        let mut params = self.default_params.clone();
        params.insert("count".to_string(), self.count.to_string());
        params.extend(extra_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        params.remove("q");

        let mut request = OutboundRequest::get(&self.base_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .param("q", query);
        for (key, value) in params {
            request = request.param(key, value);
        }
        request
    }
}

#[async_trait]
impl WebSearch for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(
        &self,
        query: &str,
        extra_params: &BTreeMap<String, String>,
    ) -> Option<Vec<SearchResult>> {
        let request = self.request(query, extra_params);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Brave search request failed: {}", e);
                return None;
            }
        };

        if !response.is_success() {
            warn!("Brave search returned HTTP {}", response.status);
            return None;
        }

        let envelope: BraveResponse = match response.json() {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Failed to parse Brave search response: {}", e);
                return None;
            }
        };

        let results = envelope.web.and_then(|web| web.results);
        match results {
            Some(results) => {
                debug!("Brave returned {} results for '{}'", results.len(), query);
                Some(results)
            }
            None => {
                warn!("Brave search response has no web results for '{}'", query);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}
