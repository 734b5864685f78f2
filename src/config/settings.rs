//! Settings structures for search-summarizer configuration

use super::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Main settings structure, loaded once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub llm: LlmSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with process environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge with variables resolved by `lookup`
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("PORT") {
            match val.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!("Ignoring PORT '{}': {}", val, e),
            }
        }
        if let Some(val) = var("BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = var("API_KEY") {
            self.server.api_key = Some(val);
        }
        if let Some(val) = var("BRAVE_API_KEY") {
            self.search.api_key = Some(val);
        }
        if let Some(val) = var("LLM_BACKEND") {
            match val.parse() {
                Ok(kind) => self.llm.backend = kind,
                Err(e) => tracing::warn!("Ignoring LLM_BACKEND: {}", e),
            }
        }
        if let Some(val) = var("LLM_BASE_URL") {
            self.llm.base_url = Some(val);
        }
        if let Some(val) = var("LLM_MODEL") {
            self.llm.model = Some(val);
        }
        if let Some(val) = var("LLM_API_KEY") {
            self.llm.api_key = Some(val);
        }
    }

    /// Check that every credential the service needs is present
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if is_blank(&self.server.api_key) {
            return Err(ConfigError::Missing("API_KEY"));
        }
        if is_blank(&self.search.api_key) {
            return Err(ConfigError::Missing("BRAVE_API_KEY"));
        }
        if self.llm.backend.requires_api_key() && is_blank(&self.llm.api_key) {
            return Err(ConfigError::Missing("LLM_API_KEY"));
        }

        for (name, secs) in [
            ("outgoing.request_timeout", self.outgoing.request_timeout),
            ("outgoing.connect_timeout", self.outgoing.connect_timeout),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::InvalidTimeout(name, secs));
            }
        }

        url::Url::parse(&self.search.base_url)
            .map_err(|e| ConfigError::InvalidUrl(self.search.base_url.clone(), e))?;
        let llm_url = self.llm.resolved_base_url();
        url::Url::parse(&llm_url).map_err(|e| ConfigError::InvalidUrl(llm_url.clone(), e))?;

        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// Shared secret expected in `Authorization: Bearer <token>`
    pub api_key: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            api_key: None,
        }
    }
}

/// Web search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Provider endpoint
    pub base_url: String,
    /// Provider subscription token
    pub api_key: Option<String>,
    /// Number of results requested from the provider
    pub count: u32,
    /// Maximum number of results handed to the model
    pub max_results: usize,
    /// Extra query parameters sent with every search
    pub extra_params: BTreeMap<String, String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.search.brave.com/res/v1/web/search".to_string(),
            api_key: None,
            count: 10,
            max_results: 10,
            extra_params: BTreeMap::new(),
        }
    }
}

/// Language-model backend kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Public Gaia node (OpenAI-compatible)
    #[default]
    Gaia,
    #[serde(rename = "openai")]
    OpenAi,
    Groq,
    Ollama,
}

impl BackendKind {
    /// Endpoint used when `llm.base_url` is not set
    pub fn default_base_url(self) -> &'static str {
        match self {
            BackendKind::Gaia => "https://llama.us.gaianet.network/v1",
            BackendKind::OpenAi => "https://api.openai.com/v1",
            BackendKind::Groq => "https://api.groq.com/openai/v1",
            BackendKind::Ollama => "http://localhost:11434",
        }
    }

    /// Model used when `llm.model` is not set
    pub fn default_model(self) -> &'static str {
        match self {
            BackendKind::Gaia => "llama",
            BackendKind::OpenAi => "gpt-4o-mini",
            BackendKind::Groq => "llama-3.1-8b-instant",
            BackendKind::Ollama => "llama3.1",
        }
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, BackendKind::OpenAi | BackendKind::Groq)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Gaia => "gaia",
            BackendKind::OpenAi => "openai",
            BackendKind::Groq => "groq",
            BackendKind::Ollama => "ollama",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaia" => Ok(BackendKind::Gaia),
            "openai" | "open_ai" => Ok(BackendKind::OpenAi),
            "groq" => Ok(BackendKind::Groq),
            "ollama" => Ok(BackendKind::Ollama),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Language-model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub backend: BackendKind,
    /// Overrides the backend's default endpoint
    pub base_url: Option<String>,
    /// Overrides the backend's default model
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Instructions sent as the system message
    pub system_prompt: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            base_url: None,
            model: None,
            api_key: None,
            temperature: None,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl LlmSettings {
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.backend.default_base_url().to_string())
    }

    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.backend.default_model().to_string())
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a research assistant. \
Summarize the web search results you are given into a concise, factual answer \
to the user's query. Prefer information that appears in several sources, \
mention the sources you rely on, and say so plainly when the results do not \
answer the query.";

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds for buffered calls
    pub request_timeout: f64,
    /// Connect timeout in seconds
    pub connect_timeout: f64,
    /// Max idle connections per host
    pub pool_maxsize: usize,
    /// User agent (none = crate name and version)
    pub useragent: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            connect_timeout: 10.0,
            pool_maxsize: 20,
            useragent: None,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete() -> Settings {
        let mut settings = Settings::default();
        settings.server.api_key = Some("gateway-secret".to_string());
        settings.search.api_key = Some("brave-token".to_string());
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.llm.backend, BackendKind::Gaia);
        assert_eq!(settings.search.count, 10);
        assert!(settings.server.api_key.is_none());
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("API_KEY", "secret"),
            ("BRAVE_API_KEY", "brave"),
            ("LLM_BACKEND", "Groq"),
            ("LLM_MODEL", "mixtral"),
            ("LLM_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.search.api_key.as_deref(), Some("brave"));
        assert_eq!(settings.llm.backend, BackendKind::Groq);
        assert_eq!(settings.llm.resolved_model(), "mixtral");
        assert!(settings.llm.api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut settings = Settings::default();
        settings.merge_vars(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(matches!(
            Settings::default().validate(),
            Err(ConfigError::Missing("API_KEY"))
        ));

        let mut settings = complete();
        settings.search.api_key = Some("  ".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing("BRAVE_API_KEY"))
        ));

        let mut settings = complete();
        settings.llm.backend = BackendKind::OpenAi;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing("LLM_API_KEY"))
        ));

        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut settings = complete();
        settings.llm.base_url = Some("not a url".to_string());
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidUrl(..))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_timeouts() {
        for secs in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let mut settings = complete();
            settings.outgoing.request_timeout = secs;
            assert!(matches!(
                settings.validate(),
                Err(ConfigError::InvalidTimeout("outgoing.request_timeout", _))
            ));
        }

        let mut settings = complete();
        settings.outgoing.connect_timeout = -0.5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidTimeout("outgoing.connect_timeout", _))
        ));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
server:
  port: 9000
  api_key: abc
search:
  extra_params:
    country: us
llm:
  backend: ollama
  model: mistral
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind_address, "0.0.0.0");
        assert_eq!(settings.search.extra_params.get("country").unwrap(), "us");
        assert_eq!(settings.llm.backend, BackendKind::Ollama);
        assert_eq!(settings.llm.resolved_base_url(), "http://localhost:11434");
        assert_eq!(settings.llm.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert!("claude".parse::<BackendKind>().is_err());
    }
}
