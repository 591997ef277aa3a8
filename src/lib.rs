#![forbid(unsafe_code)]
#![doc = r#"
Chatwrap

Thin client for OpenAI Chat Completions with a strict prompt allow-list and a bundled token counter.

Crate highlights
- Validation: `validate(&ParameterSet, &ParameterSchema)` reports the first unknown key or mistyped value.
- Client: `ChatClient::ask` sends one user turn and returns the first choice's text; every upstream failure becomes a `RemoteError`.
- Tokens: `count_tokens` counts cl100k_base tokens.

Modules
- `validation`: Parameter schema, value kinds, validator.
- `config`: Prompt files (JSON/YAML) and credential resolution.
- `models`: Messages and Chat Completions responses.
- `endpoint`: Completion endpoint trait and its HTTP implementation.
- `client`: Conversation client.
- `tokens`: tiktoken-based token counting.
- `util`: Shared helpers (tracing, env, HTTP client).
"#]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod models;
pub mod tokens;
pub mod util;
pub mod validation;

pub use crate::client::{ChatClient, RemoteError};
pub use crate::config::{check_prompt, load_prompt, resolve_api_key, ConfigError, PromptSource};
pub use crate::endpoint::{CompletionEndpoint, HttpCompletionEndpoint, HttpEndpointConfig};
pub use crate::models::{
    ChatCompletion, Choice, ChoiceMessage, Message, MessageContent, Role, Usage,
};
pub use crate::tokens::{count_tokens, TokenCounter};
pub use crate::validation::{
    validate, FieldSpec, ParameterSchema, ParameterSet, SchemaViolation, ValueKind,
};
