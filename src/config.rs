//! Prompt Configuration Module
//!
//! Loads the default parameter set from a JSON or YAML file and resolves the
//! API credential. Everything loaded here is checked against
//! [`ParameterSchema::CHAT_COMPLETIONS`] before a client will use it.

use crate::util;
use crate::validation::{validate, ParameterSchema, ParameterSet, SchemaViolation};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Env var naming the prompt file
pub const CONFIG_PATH_ENV: &str = "CHATWRAP_CONFIG";

/// Prompt file used when `CHATWRAP_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/openai.json";

/// Keys every prompt must define
pub const REQUIRED_KEYS: &[&str] = &["model"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No OpenAI API key provided")]
    MissingApiKey,

    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("Missing required key '{0}' in prompt config")]
    MissingKey(String),

    #[error("Failed to read prompt config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse prompt config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Resolve the API key: explicit value first, then `OPENAI_API_KEY`.
/// Empty strings count as absent.
pub fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(util::api_key_from_env)
        .ok_or(ConfigError::MissingApiKey)
}

/// Validate a prompt and make sure the required keys are present.
pub fn check_prompt(prompt: &ParameterSet) -> Result<()> {
    validate(prompt, &ParameterSchema::CHAT_COMPLETIONS)?;
    if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !prompt.contains_key(**k)) {
        return Err(ConfigError::MissingKey(missing.to_string()));
    }
    Ok(())
}

/// Where a client's default prompt comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSource {
    path: PathBuf,
}

impl PromptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `CHATWRAP_CONFIG` if set, else `config/openai.json`.
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(p) if !p.trim().is_empty() => Self::new(p.trim()),
            _ => Self::new(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and check the prompt.
    pub fn load(&self) -> Result<ParameterSet> {
        let prompt = load_prompt(&self.path)?;
        check_prompt(&prompt)?;
        tracing::debug!(
            "Loaded prompt config from {} ({} keys)",
            self.path.display(),
            prompt.len()
        );
        Ok(prompt)
    }
}

/// Parse a prompt file without checking it. `.yaml`/`.yml` files are read as
/// YAML, anything else as JSON. Key order follows the document.
pub fn load_prompt<P: AsRef<Path>>(path: P) -> Result<ParameterSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let parsed: std::result::Result<Value, String> = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };

    match parsed {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("expected a map at the top level, got {}", kind_name(&other)),
        }),
        Err(message) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    crate::validation::ValueKind::of(value).as_str()
}
