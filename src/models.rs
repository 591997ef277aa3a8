//! Chat Completions data structures.
//!
//! Only the parts of the response the client reads are modeled; unknown fields
//! are ignored so upstream additions never break decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role. Roles this crate does not name are kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
    Tool,
    #[serde(untagged)]
    Other(String),
}

/// Message payload: plain text, content parts (text, images, audio), or
/// nothing at all for tool-call-only assistant turns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Value>),
    Empty,
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    #[serde(default = "empty_content")]
    pub content: MessageContent,
}

fn empty_content() -> MessageContent {
    MessageContent::Empty
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Text of a plain-text message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn developer(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Developer, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// JSON form used inside a parameter set's `messages` array.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "role": self.role,
            "content": self.content,
        })
    }
}

/// Chat Completions response body
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub object: String,

    #[serde(default)]
    pub created: u64,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Text of the first choice, if the upstream returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

/// Candidate reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,

    pub message: ChoiceMessage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default = "default_assistant_role")]
    pub role: String,

    /// Absent when the model answered only with tool calls or refused
    #[serde(default)]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

fn default_assistant_role() -> String {
    "assistant".to_string()
}

/// Token accounting reported by the upstream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_completion_and_first_content() {
        let body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1728000000,
            "model": "gpt-4o-mini",
            "system_fingerprint": "fp_abc",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Washington, D.C."},
                    "logprobs": null,
                    "finish_reason": "stop"
                },
                {
                    "index": 1,
                    "message": {"role": "assistant", "content": "DC"},
                    "finish_reason": "stop"
                }
            ],
            "usage": {"prompt_tokens": 14, "completion_tokens": 4, "total_tokens": 18}
        });

        let completion: ChatCompletion = serde_json::from_value(body).unwrap();
        assert_eq!(completion.first_content(), Some("Washington, D.C."));
        assert_eq!(completion.usage.unwrap().total_tokens, 18);
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_first_content_missing() {
        let empty = ChatCompletion::default();
        assert_eq!(empty.first_content(), None);

        let tool_only: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(tool_only.first_content(), None);
        assert_eq!(tool_only.choices[0].message.role, "assistant");
    }

    #[test]
    fn test_message_json_shape() {
        assert_eq!(
            Message::user("hi").to_value(),
            json!({"role": "user", "content": "hi"})
        );
        let back: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "yo"})).unwrap();
        assert_eq!(back, Message::assistant("yo"));
        assert_eq!(back.text(), Some("yo"));
    }

    #[test]
    fn test_message_keeps_unnamed_roles_and_content_parts() {
        let developer: Message =
            serde_json::from_value(json!({"role": "developer", "content": "rules"})).unwrap();
        assert_eq!(developer, Message::developer("rules"));

        let custom: Message =
            serde_json::from_value(json!({"role": "critic", "content": "meh"})).unwrap();
        assert_eq!(custom.role, Role::Other("critic".to_string()));
        assert_eq!(custom.to_value(), json!({"role": "critic", "content": "meh"}));

        let parts = json!([{"type": "text", "text": "what is this?"}]);
        let multimodal: Message =
            serde_json::from_value(json!({"role": "user", "content": parts})).unwrap();
        assert_eq!(
            multimodal.content,
            MessageContent::Parts(parts.as_array().cloned().unwrap())
        );
        assert_eq!(multimodal.text(), None);

        let tool_call: Message =
            serde_json::from_value(json!({"role": "assistant", "content": null})).unwrap();
        assert_eq!(tool_call.content, MessageContent::Empty);
        let no_content: Message = serde_json::from_value(json!({"role": "assistant"})).unwrap();
        assert_eq!(no_content.content, MessageContent::Empty);
    }
}
