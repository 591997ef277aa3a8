//! Prompt Validation Module
//!
//! Checks a Chat Completions parameter set against a fixed allow-list:
//! - Every key must be known to the schema
//! - Every value must be one of the kinds the schema accepts for that key
//!
//! Validation stops at the first violation, in the parameter set's own order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Request parameters keyed by name, in document order.
pub type ParameterSet = Map<String, Value>;

/// Runtime kind of a JSON parameter value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Boolean,
    /// Whole number representable as i64 or u64
    Integer,
    /// Any other number
    Double,
    /// JSON list
    Array,
    /// JSON map
    Object,
    Null,
}

impl ValueKind {
    /// Kind of the given value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Double,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One allowed parameter and the kinds it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub accepts: &'static [ValueKind],
}

impl FieldSpec {
    pub const fn new(name: &'static str, accepts: &'static [ValueKind]) -> Self {
        Self { name, accepts }
    }

    pub fn allows(&self, kind: ValueKind) -> bool {
        self.accepts.contains(&kind)
    }
}

use ValueKind::{Array, Boolean, Double, Integer, Object, String as Str};

macro_rules! field {
    ($name:literal, $($kind:expr),+) => {
        FieldSpec {
            name: $name,
            accepts: &[$($kind),+],
        }
    };
}

/// Immutable allow-list of parameter names and accepted value kinds.
///
/// Schemas are `const` data. Changing the accepted parameters means defining a
/// new schema with a new `version`, never editing one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSchema {
    version: &'static str,
    fields: &'static [FieldSpec],
}

impl ParameterSchema {
    /// Chat Completions request parameters.
    pub const CHAT_COMPLETIONS: ParameterSchema = ParameterSchema {
        version: "chat-completions/v1",
        fields: &[
            field!("model", Str),
            field!("messages", Array),
            field!("store", Boolean),
            field!("metadata", Object),
            field!("logit_bias", Object),
            field!("logprobs", Boolean),
            field!("top_logprobs", Integer),
            field!("n", Integer),
            field!("modalities", Array),
            field!("prediction", Object),
            field!("audio", Object),
            field!("response_format", Object),
            field!("seed", Integer),
            field!("service_tier", Str),
            field!("stream", Boolean),
            field!("stream_options", Object),
            field!("parallel_tool_calls", Boolean),
            field!("user", Str),
            field!("function_call", Str, Object),
            field!("functions", Array),
            field!("tools", Array),
            field!("tool_choice", Str, Object),
            field!("temperature", Double, Integer),
            field!("top_p", Double, Integer),
            field!("frequency_penalty", Double, Integer),
            field!("presence_penalty", Double, Integer),
            field!("max_tokens", Integer),
            field!("max_completion_tokens", Integer),
            field!("stop", Str, Array),
            field!("reasoning_effort", Str),
        ],
    };

    pub const fn new(version: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { version, fields }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up a parameter by name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::CHAT_COMPLETIONS
    }
}

/// First problem found in a parameter set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("Invalid key '{key}' in prompt config")]
    UnknownKey { key: String },

    #[error(
        "Invalid type for '{key}' in prompt config. Expected {}, got {actual}",
        join_kinds(.expected)
    )]
    TypeMismatch {
        key: String,
        expected: Vec<ValueKind>,
        actual: ValueKind,
    },
}

impl SchemaViolation {
    /// Offending parameter name
    pub fn key(&self) -> &str {
        match self {
            Self::UnknownKey { key } | Self::TypeMismatch { key, .. } => key,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownKey { .. } => "unknown key",
            Self::TypeMismatch { .. } => "type mismatch",
        }
    }
}

fn join_kinds(kinds: &[ValueKind]) -> String {
    kinds
        .iter()
        .map(ValueKind::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Validate `params` against `schema`, reporting the first violation.
pub fn validate(params: &ParameterSet, schema: &ParameterSchema) -> Result<(), SchemaViolation> {
    for (key, value) in params {
        let field = schema
            .field(key)
            .ok_or_else(|| SchemaViolation::UnknownKey { key: key.clone() })?;

        let actual = ValueKind::of(value);
        if !field.allows(actual) {
            return Err(SchemaViolation::TypeMismatch {
                key: key.clone(),
                expected: field.accepts.to_vec(),
                actual,
            });
        }
    }
    Ok(())
}
