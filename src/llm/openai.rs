//! OpenAI-compatible chat completions backend
//!
//! Serves the `openai`, `groq` and `gaia` backend kinds; they differ only in
//! endpoint, model and whether a key is sent.

use super::error::LlmError;
use super::stream::{spawn_line_reader, LineOutcome};
use super::traits::{FragmentStream, LanguageModel, Prompt};
use crate::network::{HttpClient, OutboundRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

pub struct OpenAiCompatible {
    client: HttpClient,
    name: String,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiCompatible {
    pub fn new(
        client: HttpClient,
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
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
        let mut body = json!({
            "model": self.model,
            "messages": prompt.messages(),
            "stream": stream,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let mut request = OutboundRequest::post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            request = request.bearer(key);
        }
        if stream {
            // Compressed SSE gets buffered by the decoder
            request = request
                .header("Accept", "text/event-stream")
                .header("Accept-Encoding", "identity")
                .header("Cache-Control", "no-cache");
        }
        request
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatible {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let request = self.build_request(prompt, false);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| LlmError::network(e.to_string()))?;

        if !response.is_success() {
            return Err(LlmError::from_status(response.status, &response.text));
        }

        let parsed: ChatResponse = serde_json::from_str(&response.text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    async fn stream(&self, prompt: &Prompt) -> Result<FragmentStream, LlmError> {
        let request = self.build_request(prompt, true);
        let response = self
            .client
            .open(request)
            .await
            .map_err(|e| LlmError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        debug!("{} stream opened for model {}", self.name, self.model);
        Ok(spawn_line_reader(response, parse_sse_line))
    }
}

/// Interpret one server-sent-events line of a chat completions stream
fn parse_sse_line(line: &str) -> LineOutcome {
    let data = match line.strip_prefix("data:") {
        Some(data) => data.trim_start(),
        None => return LineOutcome::Skip,
    };

    if data == "[DONE]" {
        return LineOutcome::Done;
    }

    match serde_json::from_str::<StreamResponse>(data) {
        Ok(StreamResponse {
            error: Some(error), ..
        }) => LineOutcome::Failed(LlmError::stream(error.message)),
        Ok(response) => {
            let content: String = response
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect();
            if content.is_empty() {
                LineOutcome::Skip
            } else {
                LineOutcome::Fragment(content)
            }
        }
        Err(e) => {
            warn!("Failed to parse SSE message: {} - data: {}", e, data);
            LineOutcome::Skip
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> OpenAiCompatible {
        OpenAiCompatible::new(
            HttpClient::new().unwrap(),
            "openai",
            format!("{}/v1/", server.uri()),
            "test-model",
        )
        .with_api_key(Some("sk-test".to_string()))
    }

    fn prompt() -> Prompt {
        Prompt::new("summarize", "what is rust?")
    }

    #[test]
    fn test_parse_sse_line() {
        assert!(matches!(parse_sse_line(": keep-alive"), LineOutcome::Skip));
        assert!(matches!(parse_sse_line(""), LineOutcome::Skip));
        assert!(matches!(parse_sse_line("data: [DONE]"), LineOutcome::Done));
        assert!(matches!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            LineOutcome::Skip
        ));
        match parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#) {
            LineOutcome::Fragment(text) => assert_eq!(text, "Hel"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(matches!(
            parse_sse_line(r#"data: {"error":{"message":"overloaded"}}"#),
            LineOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "test-model", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Rust is a language."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summary = backend(&server).complete(&prompt()).await.unwrap();
        assert_eq!(summary, "Rust is a language.");
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "Invalid API key"}})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_complete_without_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend(&server).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_stream_fragments_in_order() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"world\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        );
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let stream = backend(&server).stream(&prompt()).await.unwrap();
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["Hello", " ", "world"]);
    }

    #[tokio::test]
    async fn test_stream_cut_off_before_done_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n"),
            )
            .mount(&server)
            .await;

        let items: Vec<Result<String, LlmError>> =
            backend(&server).stream(&prompt()).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "Hel");
        assert!(matches!(items[1], Err(LlmError::Stream(_))));
    }

    #[tokio::test]
    async fn test_stream_error_status_fails_before_fragments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = backend(&server).stream(&prompt()).await;
        assert!(matches!(result, Err(LlmError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let backend = OpenAiCompatible::new(
            HttpClient::new().unwrap(),
            "gaia",
            "http://127.0.0.1:1/v1",
            "llama",
        );
        let err = backend.complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
    }
}
