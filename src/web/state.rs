//! Application state shared across handlers

use super::auth::ExemptPaths;
use super::docs::{openapi_document, route_docs};
use super::Templates;
use crate::config::{ConfigError, Settings};
use crate::llm::build_backend;
use crate::network::HttpClient;
use crate::search::BraveSearch;
use crate::summary::SummaryTool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Search-then-summarize pipeline
    pub summarizer: Arc<SummaryTool>,
    /// Paths served without authentication
    pub exempt_paths: Arc<ExemptPaths>,
    /// Pre-rendered interactive API docs
    pub docs_page: Arc<str>,
    api_key: Arc<str>,
}

impl AppState {
    /// Create application state around an existing summarizer
    pub fn new(settings: &Settings, summarizer: SummaryTool) -> anyhow::Result<Self> {
        let api_key = settings
            .server
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::Missing("API_KEY"))?;

        let templates = Templates::new()?;
        let docs_page = templates.render_api_docs(&openapi_document(&route_docs()))?;

        Ok(Self {
            summarizer: Arc::new(summarizer),
            exempt_paths: Arc::new(ExemptPaths::default()),
            docs_page: docs_page.into(),
            api_key: api_key.into(),
        })
    }

    /// Build the search client, backend and summarizer described by `settings`
    pub fn from_settings(settings: Settings, client: HttpClient) -> anyhow::Result<Self> {
        settings.validate()?;

        let search_key = settings
            .search
            .api_key
            .clone()
            .ok_or(ConfigError::Missing("BRAVE_API_KEY"))?;
        let search = BraveSearch::from_settings(client.clone(), &settings.search, search_key);
        let model = build_backend(&settings.llm, client);

        let summarizer = SummaryTool::new(Arc::new(search), model)
            .with_system_prompt(settings.llm.system_prompt.clone())
            .with_max_results(settings.search.max_results);

        Self::new(&settings, summarizer)
    }

    /// Configured gateway secret
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
