//! HTTP client for making requests to upstream providers

use super::request::{HttpMethod, OutboundRequest, OutboundResponse};
use crate::config::OutgoingSettings;
use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Shared, pooled HTTP client configured from the outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let user_agent = settings
            .useragent
            .clone()
            .unwrap_or_else(default_user_agent);

        // No client-wide total timeout: streamed generations may run long,
        // buffered calls set their own per-request timeout.
        let mut builder = Client::builder()
            .connect_timeout(Duration::try_from_secs_f64(settings.connect_timeout)?)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            request_timeout: Duration::try_from_secs_f64(settings.request_timeout)?,
        })
    }

    /// Execute a request and buffer the whole response body
    pub async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse> {
        debug!("{:?} {}", request.method, request.url);

        let response = self
            .build(request)
            .timeout(self.request_timeout)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Execute a request and hand back the unread response for streaming.
    ///
    /// Only the connect timeout applies; the caller owns the body and
    /// dropping it closes the upstream connection.
    pub async fn open(&self, request: OutboundRequest) -> Result<Response> {
        debug!("{:?} {} (streaming)", request.method, request.url);
        Ok(self.build(request).send().await?)
    }

    fn build(&self, request: OutboundRequest) -> RequestBuilder {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.json(&body);
        }

        req_builder
    }

    /// Parse response into OutboundResponse
    async fn parse_response(response: Response) -> Result<OutboundResponse> {
        let status = response.status().as_u16();

        let text = response.text().await?;

        Ok(OutboundResponse {
            status,
            text,
        })
    }
}

fn default_user_agent() -> String {
    format!("search-summarizer/{}", crate::VERSION)
}
