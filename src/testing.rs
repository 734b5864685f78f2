//! Stub search providers and backends for unit tests

use crate::llm::{FragmentStream, LanguageModel, LlmError, Prompt};
use crate::results::SearchResult;
use crate::search::WebSearch;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Search provider returning a fixed answer and counting calls
pub struct StubSearch {
    results: Option<Vec<SearchResult>>,
    calls: AtomicUsize,
}

impl StubSearch {
    pub fn new(results: Option<Vec<SearchResult>>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    fn name(&self) -> &str {
        "stub"
    }

    async fn search(
        &self,
        _query: &str,
        _extra_params: &BTreeMap<String, String>,
    ) -> Option<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.clone()
    }
}

/// Backend replaying fixed fragments and recording prompts
pub struct StubModel {
    fragments: Vec<String>,
    delay: Duration,
    fail: bool,
    fail_mid_stream: bool,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubModel {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            delay: Duration::ZERO,
            fail: false,
            fail_mid_stream: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose calls fail with an API error
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    /// Streams the fragments, then fails
    pub fn failing_mid_stream(fragments: &[&str]) -> Self {
        Self {
            fail_mid_stream: true,
            ..Self::new(fragments)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &Prompt) -> Result<(), LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        if self.fail {
            Err(LlmError::api(503, "backend unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.record(prompt)?;
        Ok(self.fragments.concat())
    }

    async fn stream(&self, prompt: &Prompt) -> Result<FragmentStream, LlmError> {
        self.record(prompt)?;
        let delay = self.delay;
        let mut items: Vec<Result<String, LlmError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if self.fail_mid_stream {
            items.push(Err(LlmError::stream("connection reset")));
        }
        let stream = futures::stream::iter(items).then(move |item| async move {
            tokio::time::sleep(delay).await;
            item
        });
        Ok(Box::pin(stream))
    }
}
