// Engine configuration, read once at process start and injected into the service
use crate::languages::LanguageTable;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://judge0-ce.p.rapidapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("language table: {0}")]
    Languages(String),
}

/// How outgoing requests authenticate against the execution service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Gateway headers: X-RapidAPI-Key / X-RapidAPI-Host
    RapidApi,
    /// Self-hosted instance: X-Auth-Token
    Token,
    None,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub auth_mode: AuthMode,
    pub poll_interval: Duration,
    pub single_timeout: Duration,
    pub batch_timeout: Duration,
    pub http_timeout: Duration,
    pub languages: LanguageTable,
    pub interpreter_url: Option<String>,
    pub interpreter_api_key: Option<String>,
    /// Per-request limit for the interpreter, which is slower than the engine
    pub interpreter_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            auth_mode: AuthMode::None,
            poll_interval: Duration::from_millis(1000),
            single_timeout: Duration::from_secs(15),
            batch_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(10),
            languages: LanguageTable::default(),
            interpreter_url: None,
            interpreter_api_key: None,
            interpreter_timeout: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let api_url = get("JUDGE0_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let api_key = get("JUDGE0_API_KEY");

        let auth_mode = match get("JUDGE0_AUTH_MODE") {
            Some(mode) => match mode.to_lowercase().as_str() {
                "rapidapi" => AuthMode::RapidApi,
                "token" => AuthMode::Token,
                "none" => AuthMode::None,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "JUDGE0_AUTH_MODE",
                        value: mode,
                        reason: "expected rapidapi, token or none".to_string(),
                    })
                }
            },
            None if api_key.is_some() => AuthMode::RapidApi,
            None => AuthMode::None,
        };

        let poll_interval = match get("VERDICT_POLL_INTERVAL_MS") {
            Some(v) => Duration::from_millis(parse_positive("VERDICT_POLL_INTERVAL_MS", v)?),
            None => defaults.poll_interval,
        };
        let single_timeout = match get("VERDICT_SINGLE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("VERDICT_SINGLE_TIMEOUT_SECS", v)?),
            None => defaults.single_timeout,
        };
        let batch_timeout = match get("VERDICT_BATCH_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("VERDICT_BATCH_TIMEOUT_SECS", v)?),
            None => defaults.batch_timeout,
        };
        let http_timeout = match get("VERDICT_HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("VERDICT_HTTP_TIMEOUT_SECS", v)?),
            None => defaults.http_timeout,
        };

        let interpreter_timeout = match get("INTERPRETER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_positive("INTERPRETER_TIMEOUT_SECS", v)?),
            None => defaults.interpreter_timeout,
        };

        let languages = match get("VERDICT_LANGUAGES_FILE") {
            Some(path) => LanguageTable::load(&PathBuf::from(path))?,
            None => defaults.languages,
        };

        Ok(Self {
            api_url,
            api_key,
            auth_mode,
            poll_interval,
            single_timeout,
            batch_timeout,
            http_timeout,
            languages,
            interpreter_url: get("INTERPRETER_URL"),
            interpreter_api_key: get("INTERPRETER_API_KEY"),
            interpreter_timeout,
        })
    }

    /// Host header value for gateway auth, derived from the API URL
    pub fn api_host(&self) -> &str {
        let without_scheme = self
            .api_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(self.api_url.as_str());
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: e.to_string(),
        }),
    }
}
