//! Ollama chat backend (newline-delimited JSON streaming)

use super::error::LlmError;
use super::stream::{spawn_line_reader, LineOutcome};
use super::traits::{FragmentStream, LanguageModel, Prompt};
use crate::network::{HttpClient, OutboundRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub struct OllamaChat {
    client: HttpClient,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OllamaChat {
    pub fn new(client: HttpClient, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_request(&self, prompt: &Prompt, stream: bool) -> OutboundRequest {
        let mut options = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            options.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tokens));
        }

        let mut body = json!({
            "model": self.model,
            "messages": prompt.messages(),
            "stream": stream,
        });
        if !options.is_empty() {
            body["options"] = serde_json::Value::Object(options);
        }

        OutboundRequest::post(format!("{}/api/chat", self.base_url)).json(body)
    }
}

#[async_trait]
impl LanguageModel for OllamaChat {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let response = self
            .client
            .execute(self.build_request(prompt, false))
            .await
            .map_err(|e| LlmError::network(e.to_string()))?;

        if !response.is_success() {
            return Err(LlmError::from_status(response.status, &response.text));
        }

        let parsed: ChatResponse = serde_json::from_str(&response.text)?;
        if let Some(error) = parsed.error {
            return Err(LlmError::api(response.status, error));
        }
        parsed
            .message
            .map(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    async fn stream(&self, prompt: &Prompt) -> Result<FragmentStream, LlmError> {
        let response = self
            .client
            .open(self.build_request(prompt, true))
            .await
            .map_err(|e| LlmError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        debug!("ollama stream opened for model {}", self.model);
        Ok(spawn_line_reader(response, parse_ndjson_line))
    }
}

/// Interpret one line of an Ollama chat stream
fn parse_ndjson_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skip;
    }

    match serde_json::from_str::<ChatResponse>(line) {
        Ok(ChatResponse {
            error: Some(error), ..
        }) => LineOutcome::Failed(LlmError::stream(error)),
        Ok(response) => {
            let content = response.message.map(|m| m.content).unwrap_or_default();
            match (content.is_empty(), response.done) {
                (false, false) => LineOutcome::Fragment(content),
                (false, true) => LineOutcome::LastFragment(content),
                (true, true) => LineOutcome::Done,
                (true, false) => LineOutcome::Skip,
            }
        }
        Err(e) => {
            warn!("Failed to parse Ollama stream line: {} - data: {}", e, line);
            LineOutcome::Skip
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> Prompt {
        Prompt::new("summarize", "what is rust?")
    }

    #[test]
    fn test_parse_ndjson_line() {
        assert!(matches!(parse_ndjson_line("  "), LineOutcome::Skip));
        assert!(matches!(
            parse_ndjson_line(r#"{"message":{"role":"assistant","content":""},"done":true}"#),
            LineOutcome::Done
        ));
        assert!(matches!(
            parse_ndjson_line(r#"{"error":"model not found"}"#),
            LineOutcome::Failed(_)
        ));
        match parse_ndjson_line(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#) {
            LineOutcome::Fragment(text) => assert_eq!(text, "Hi"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match parse_ndjson_line(r#"{"message":{"role":"assistant","content":"!"},"done":true}"#) {
            LineOutcome::LastFragment(text) => assert_eq!(text, "!"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3.1", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "Rust is fast."},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = OllamaChat::new(HttpClient::new().unwrap(), server.uri(), "llama3.1");
        assert_eq!(backend.complete(&prompt()).await.unwrap(), "Rust is fast.");
    }

    #[tokio::test]
    async fn test_stream() {
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\" \"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"world\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}",
        );
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let backend = OllamaChat::new(HttpClient::new().unwrap(), server.uri(), "llama3.1");
        let fragments: Vec<String> = backend
            .stream(&prompt())
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments.concat(), "Hello world");
        assert_eq!(fragments.len(), 3);
    }

    #[tokio::test]
    async fn test_stream_error_line_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "{\"message\":{\"content\":\"partial\"},\"done\":false}\n{\"error\":\"out of memory\"}\n",
            ))
            .mount(&server)
            .await;

        let backend = OllamaChat::new(HttpClient::new().unwrap(), server.uri(), "llama3.1");
        let items: Vec<Result<String, LlmError>> =
            backend.stream(&prompt()).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
        assert!(matches!(items[1], Err(LlmError::Stream(_))));
    }
}
