//! Conversation Client Module
//!
//! `ChatClient` owns a completion endpoint, the validated default prompt and
//! the running conversation built on top of it. Each `ask` is one round-trip.
//! Successful turns are appended to the conversation; failed turns leave it
//! untouched.

use crate::config::{self, PromptSource};
use crate::endpoint::{CompletionEndpoint, HttpCompletionEndpoint, HttpEndpointConfig};
use crate::models::{ChatCompletion, Message};
use crate::tokens;
use crate::validation::ParameterSet;
use serde_json::Value;
use std::sync::Arc;

/// Any failure reported by the completion endpoint. The original message is
/// kept; the kind of failure is not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for RemoteError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

/// Client for one conversation
pub struct ChatClient {
    endpoint: Arc<dyn CompletionEndpoint>,
    source: Option<PromptSource>,
    defaults: ParameterSet,
    prompt: ParameterSet,
}

impl ChatClient {
    /// HTTP client for the OpenAI API with an explicit default prompt.
    ///
    /// `api_key` falls back to `OPENAI_API_KEY` when absent or empty.
    pub fn new(api_key: Option<&str>, prompt: ParameterSet) -> config::Result<Self> {
        let key = config::resolve_api_key(api_key)?;
        let endpoint = HttpCompletionEndpoint::new(key, HttpEndpointConfig::default());
        Self::with_endpoint(Arc::new(endpoint), prompt)
    }

    /// HTTP client whose default prompt is read from [`PromptSource::from_env`].
    pub fn connect(api_key: Option<&str>) -> config::Result<Self> {
        Self::connect_with_source(api_key, PromptSource::from_env())
    }

    pub fn connect_with_source(api_key: Option<&str>, source: PromptSource) -> config::Result<Self> {
        let key = config::resolve_api_key(api_key)?;
        let prompt = source.load()?;
        let endpoint = HttpCompletionEndpoint::new(key, HttpEndpointConfig::default());
        let mut client = Self::with_endpoint(Arc::new(endpoint), prompt)?;
        client.source = Some(source);
        Ok(client)
    }

    /// Client over any endpoint. The prompt is checked before use.
    pub fn with_endpoint(
        endpoint: Arc<dyn CompletionEndpoint>,
        prompt: ParameterSet,
    ) -> config::Result<Self> {
        config::check_prompt(&prompt)?;
        let model = prompt.get("model").and_then(Value::as_str).unwrap_or("?");
        tracing::info!("Chat client ready for model {}", model);
        Ok(Self {
            endpoint,
            source: None,
            prompt: prompt.clone(),
            defaults: prompt,
        })
    }

    /// Send `text` as the next user turn and return the reply.
    pub async fn ask(&mut self, text: &str) -> Result<String, RemoteError> {
        let mut request = self.prompt.clone();
        push_message(&mut request, Message::user(text));

        let turns = message_list(&request).len();
        tracing::debug!("Sending chat completion with {} messages", turns);
        let completion = self.create(&request).await?;
        let reply = completion
            .first_content()
            .ok_or_else(|| RemoteError::new("Chat completion contained no reply content"))?
            .to_string();
        tracing::debug!("Received reply of {} bytes", reply.len());

        push_message(&mut request, Message::assistant(reply.as_str()));
        self.prompt = request;
        Ok(reply)
    }

    /// Submit an arbitrary parameter set as-is.
    pub async fn create(&self, params: &ParameterSet) -> Result<ChatCompletion, RemoteError> {
        self.endpoint.create(params).await.map_err(RemoteError::from)
    }

    /// Forget the conversation and return to the default prompt.
    pub fn reset(&mut self) {
        self.prompt = self.defaults.clone();
    }

    /// Re-read the prompt source, if this client has one, then reset.
    pub fn reload(&mut self) -> config::Result<()> {
        if let Some(source) = &self.source {
            self.defaults = source.load()?;
            tracing::info!("Reloaded prompt config from {}", source.path().display());
        }
        self.reset();
        Ok(())
    }

    /// Current parameter set, conversation included
    pub fn prompt(&self) -> &ParameterSet {
        &self.prompt
    }

    /// Default parameter set the conversation started from
    pub fn defaults(&self) -> &ParameterSet {
        &self.defaults
    }

    /// Conversation so far, exactly as it goes on the wire.
    pub fn messages(&self) -> &[Value] {
        message_list(&self.prompt)
    }

    /// Conversation so far as typed messages. Any string role is kept, as is
    /// text, content-part or null content; malformed entries are left out.
    pub fn history(&self) -> Vec<Message> {
        self.messages()
            .iter()
            .filter_map(|m| serde_json::from_value(m.clone()).ok())
            .collect()
    }

    pub fn token_count(&self, text: &str) -> anyhow::Result<usize> {
        tokens::count_tokens(text)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("source", &self.source)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

fn message_list(params: &ParameterSet) -> &[Value] {
    params
        .get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn push_message(params: &mut ParameterSet, message: Message) {
    let slot = params
        .entry("messages")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    if let Value::Array(list) = slot {
        list.push(message.to_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_message_creates_and_appends() {
        let mut params = json!({"model": "m"}).as_object().cloned().unwrap();
        push_message(&mut params, Message::user("one"));
        push_message(&mut params, Message::assistant("two"));
        assert_eq!(
            params.get("messages"),
            Some(&json!([
                {"role": "user", "content": "one"},
                {"role": "assistant", "content": "two"}
            ]))
        );
        assert_eq!(message_list(&params).len(), 2);
    }

    #[test]
    fn test_remote_error_keeps_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("sending request");
        let remote = RemoteError::from(err);
        assert_eq!(remote.message(), "sending request: connection refused");
        assert_eq!(remote.to_string(), remote.message());
    }
}
