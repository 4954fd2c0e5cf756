use anyhow::{Context, Result};

use crate::errors::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client configuration loaded from environment variables.
/// The request deadlines are fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_url(None)
    }

    /// Like `from_env`, but an explicit `api_url` wins over `RESUME_API_URL`
    /// and is validated the same way.
    pub fn from_env_with_url(api_url: Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok(), api_url)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let (raw_url, source) = match api_url {
            Some(url) => (url, "--api-url"),
            None => (
                lookup("RESUME_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                "RESUME_API_URL",
            ),
        };
        Ok(Config {
            api_url: normalize_base_url(&raw_url).with_context(|| format!("{source} is invalid"))?,
            api_token: lookup("RESUME_API_TOKEN").filter(|t| !t.trim().is_empty()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
