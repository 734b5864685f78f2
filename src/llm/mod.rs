//! Language-model backends
//!
//! Every backend implements [`LanguageModel`]; the concrete one is chosen
//! from `llm.backend` when the service starts.

mod error;
mod ollama;
mod openai;
mod stream;
mod traits;

pub use error::LlmError;
pub use ollama::OllamaChat;
pub use openai::OpenAiCompatible;
pub use traits::{FragmentStream, LanguageModel, Prompt};

use crate::config::{BackendKind, LlmSettings};
use crate::network::HttpClient;
use std::sync::Arc;

/// Construct the backend selected in `settings`
pub fn build_backend(settings: &LlmSettings, client: HttpClient) -> Arc<dyn LanguageModel> {
    let base_url = settings.resolved_base_url();
    let model = settings.resolved_model();

    match settings.backend {
        BackendKind::Ollama => Arc::new(
            OllamaChat::new(client, base_url, model)
                .with_temperature(settings.temperature)
                .with_max_tokens(settings.max_tokens),
        ),
        kind @ (BackendKind::Gaia | BackendKind::OpenAi | BackendKind::Groq) => Arc::new(
            OpenAiCompatible::new(client, kind.as_str(), base_url, model)
                .with_api_key(settings.api_key.clone())
                .with_temperature(settings.temperature)
                .with_max_tokens(settings.max_tokens),
        ),
    }
}
