use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the fallback API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Initialize dotenv and structured tracing based on RUST_LOG.
/// - Supports explicit env file paths via ENV_FILE, DOTENV_PATH
/// - Falls back to default .env discovery
/// - Logs the source used
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    // RUST_LOG may come from the env file loaded above
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::debug!("Environment loaded from: {}", env_source);
}

/// Read the fallback API key from the environment. Empty values count as unset.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

/// Resolve the OpenAI base URL from environment or use the default public endpoint.
pub fn openai_base_url() -> String {
    match std::env::var("OPENAI_BASE_URL") {
        Ok(val) if !val.trim().is_empty() => val.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.into(),
    }
}

/// `1`, `true`, `yes` and `on` (any case) are truthy.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Env var: overall request timeout in seconds
pub const HTTP_TIMEOUT_ENV: &str = "CHATWRAP_HTTP_TIMEOUT_SECONDS";

/// Env var: truthy value disables every proxy, including `HTTPS_PROXY`
pub const NO_PROXY_ENV: &str = "CHATWRAP_NO_PROXY";

/// Env var: proxy used for all API traffic
pub const PROXY_URL_ENV: &str = "CHATWRAP_PROXY_URL";

/// How outbound requests pick a proxy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxyMode {
    /// reqwest's own handling of `HTTP_PROXY`, `HTTPS_PROXY` and `NO_PROXY`
    #[default]
    System,
    Disabled,
    Url(String),
}

/// Settings for the client that talks to the API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Option<Duration>,
    pub proxy: ProxyMode,
}

impl HttpSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank, zero or unparsable values are
    /// ignored; `CHATWRAP_NO_PROXY` beats `CHATWRAP_PROXY_URL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout = lookup(HTTP_TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let proxy = if lookup(NO_PROXY_ENV).is_some_and(|v| is_truthy(&v)) {
            ProxyMode::Disabled
        } else {
            match lookup(PROXY_URL_ENV) {
                Some(url) if !url.trim().is_empty() => ProxyMode::Url(url.trim().to_string()),
                _ => ProxyMode::System,
            }
        };

        Self { timeout, proxy }
    }

    /// Build the client. A bad proxy URL is logged and skipped.
    pub fn client(&self) -> reqwest::Client {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("chatwrap/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        match &self.proxy {
            ProxyMode::System => {}
            ProxyMode::Disabled => builder = builder.no_proxy(),
            ProxyMode::Url(url) => match reqwest::Proxy::all(url.as_str()) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!("Ignoring {}: {}", PROXY_URL_ENV, e),
            },
        }

        builder.build().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
    }
}

/// HTTP client configured from [`HttpSettings::from_env`].
pub fn build_http_client_from_env() -> reqwest::Client {
    HttpSettings::from_env().client()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_is_truthy() {
        for v in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["", "0", "false", "off", "nope"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    fn settings(vars: &[(&str, &str)]) -> HttpSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HttpSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_http_settings_from_lookup() {
        assert_eq!(settings(&[]), HttpSettings::default());

        let s = settings(&[(HTTP_TIMEOUT_ENV, " 30 "), (PROXY_URL_ENV, "http://proxy:3128")]);
        assert_eq!(s.timeout, Some(Duration::from_secs(30)));
        assert_eq!(s.proxy, ProxyMode::Url("http://proxy:3128".into()));

        let s = settings(&[
            (HTTP_TIMEOUT_ENV, "soon"),
            (NO_PROXY_ENV, "yes"),
            (PROXY_URL_ENV, "http://proxy:3128"),
        ]);
        assert_eq!(s.timeout, None);
        assert_eq!(s.proxy, ProxyMode::Disabled);

        let s = settings(&[(HTTP_TIMEOUT_ENV, "0"), (PROXY_URL_ENV, "  ")]);
        assert_eq!(s, HttpSettings::default());
    }

    #[test]
    fn test_http_settings_build_client() {
        // Unparsable proxy URLs are skipped rather than failing the build
        let s = HttpSettings {
            timeout: Some(Duration::from_secs(5)),
            proxy: ProxyMode::Url("::not a url::".into()),
        };
        let _client = s.client();

        let _client = HttpSettings {
            timeout: None,
            proxy: ProxyMode::Disabled,
        }
        .client();
    }
}
