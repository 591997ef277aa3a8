//! Completion Endpoint Module
//!
//! The seam between the conversation client and whatever answers Chat
//! Completions requests:
//! - `CompletionEndpoint` trait: submit a parameter set, get a completion back
//! - `HttpCompletionEndpoint`: the OpenAI HTTP API (or any compatible server)
//!
//! Endpoints report failures as plain `anyhow::Error`s. The client folds every
//! one of them into a single `RemoteError`.

use crate::models::ChatCompletion;
use crate::util;
use crate::validation::ParameterSet;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use http::header;
use serde_json::Value;
use std::time::Duration;

/// Anything that can answer a Chat Completions request
#[async_trait]
pub trait CompletionEndpoint: Send + Sync {
    /// Submit `params` and return the decoded completion
    async fn create(&self, params: &ParameterSet) -> Result<ChatCompletion>;
}

/// HTTP endpoint configuration
#[derive(Debug, Clone)]
pub struct HttpEndpointConfig {
    /// API base URL, e.g. "https://api.openai.com/v1"
    pub base_url: String,

    /// Optional per-request timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// HTTP client (shared)
    pub client: Option<reqwest::Client>,
}

impl Default for HttpEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: util::openai_base_url(),
            timeout_ms: None,
            client: None,
        }
    }
}

/// Chat Completions over HTTP with bearer authentication
pub struct HttpCompletionEndpoint {
    api_key: String,
    url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpCompletionEndpoint {
    pub fn new(api_key: impl Into<String>, mut config: HttpEndpointConfig) -> Self {
        let client = config
            .client
            .take()
            .unwrap_or_else(util::build_http_client_from_env);
        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        Self {
            api_key: api_key.into(),
            url,
            timeout: config.timeout_ms.map(Duration::from_millis),
            client,
        }
    }

    /// Full URL requests are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for HttpCompletionEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionEndpoint")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl CompletionEndpoint for HttpCompletionEndpoint {
    async fn create(&self, params: &ParameterSet) -> Result<ChatCompletion> {
        let mut rb = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .json(params);
        if let Some(timeout) = self.timeout {
            rb = rb.timeout(timeout);
        }

        let response = rb.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenAI returned {}: {}",
                status,
                upstream_error_message(&body)
            ));
        }

        serde_json::from_str(&body).context("Failed to parse chat completion")
    }
}

/// `error.message` from an OpenAI-style error body, else the trimmed body.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
