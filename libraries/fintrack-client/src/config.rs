//! Client configuration.
//!
//! Loaded from an optional `fintrack.toml` plus `FINTRACK_*` environment
//! variables (nested keys use `__`, e.g. `FINTRACK_FALLBACK__AUTO_FALLBACK`).

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deployment environment the client runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; the mock auth backend may be used
    #[default]
    Development,
    /// Production; only the real API is ever used
    Production,
}

/// Development fallback behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Switch to the mock backend when the API is unreachable or returns 5xx
    #[serde(default = "default_auto_fallback")]
    pub auto_fallback: bool,

    /// Simulated latency of mock auth calls
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            auto_fallback: default_auto_fallback(),
            latency_ms: default_latency_ms(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,

    /// API base URL used in development
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API base URL used in production
    #[serde(default)]
    pub api_url_production: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Declared retry count. Requests are not retried automatically.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Declared delay between retries
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Where the persisted session (tokens, user, fallback flag) lives
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    #[serde(default)]
    pub fallback: FallbackSettings,
}

fn default_api_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".fintrack/session.json")
}

fn default_auto_fallback() -> bool {
    true
}

fn default_latency_ms() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            api_url: default_api_url(),
            api_url_production: String::new(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            session_file: default_session_file(),
            fallback: FallbackSettings::default(),
        }
    }
}

impl ClientConfig {
    /// Load from `fintrack.toml` in the working directory (if present) and
    /// the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from an explicit file (required) or the default optional one.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("fintrack").required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix("FINTRACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the selected base URL and timeout are usable
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url();
        if url.is_empty() {
            let key = match self.environment {
                Environment::Development => "api_url",
                Environment::Production => "api_url_production",
            };
            return Err(ClientError::Config(format!("{key} must be set")));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "{url} must start with http:// or https://"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Base URL for the configured environment, without a trailing slash
    pub fn base_url(&self) -> &str {
        let url = match self.environment {
            Environment::Development => &self.api_url,
            Environment::Production => &self.api_url_production,
        };
        url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
