//! Configuration management for AnswerForge services
//!
//! Settings are read once at startup from environment variables (after an
//! optional `.env` file has been loaded by the binary). Variable names are
//! matched case-sensitively and anything not listed in [`RECOGNIZED_KEYS`]
//! is ignored.

use crate::errors::Result;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// Environment variables read by [`Settings::load`]
pub const RECOGNIZED_KEYS: &[&str] = &[
    "APP_ADDRESS",
    "APP_PORT",
    "APP_NAME",
    "APP_VERSION",
    "LOGGING_LEVEL",
    "ENABLE_DEBUG",
    "JSON_LOGGING",
    "API_PREFIX",
    "OPENAI_API_KEY",
    "OPENAI_ENDPOINT",
    "OPENAI_MODEL_NAME",
    "SYSTEM_INSTRUCTION",
    "SEARCH_ENDPOINT",
    "SEARCH_MAX_RESULTS",
    "FETCH_TIMEOUT_SECS",
    "LLM_TIMEOUT_SECS",
];

/// Default persona for the assistant
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Представь, что ты профессионал по поиску информации. \
Тебе необходимо помогать находить ответы на вопросы по университету ИТМО.";

/// Process-wide application settings
///
/// Field names are the lowercased environment variable names.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Settings {
    /// Address to bind to
    #[serde(default = "default_address")]
    pub app_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub app_port: u16,

    #[validate(length(min = 1))]
    pub app_name: String,

    #[serde(default = "default_version")]
    pub app_version: String,

    /// Log level (Python-style names such as `WARNING` are accepted)
    #[serde(default = "default_log_level")]
    pub logging_level: String,

    /// Attach source locations to log records
    #[serde(default = "default_enable_debug")]
    pub enable_debug: bool,

    /// Emit log records as JSON
    #[serde(default)]
    pub json_logging: bool,

    /// Prefix the prediction route is mounted under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub openai_api_key: String,

    /// OpenAI-compatible base URL, e.g. `https://api.openai.com/v1`
    #[validate(url)]
    pub openai_endpoint: String,

    #[serde(default = "default_model_name")]
    pub openai_model_name: String,

    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// DuckDuckGo HTML search endpoint
    #[serde(default = "default_search_endpoint")]
    #[validate(url)]
    pub search_endpoint: String,

    /// Number of search hits used as sources
    #[serde(default = "default_search_max_results")]
    #[validate(range(min = 1))]
    pub search_max_results: usize,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
}

// Default value functions
fn default_address() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_version() -> String { "0.0.1".to_string() }
fn default_log_level() -> String { "DEBUG".to_string() }
fn default_enable_debug() -> bool { true }
fn default_api_prefix() -> String { "/api".to_string() }
fn default_model_name() -> String { "gpt-4o-mini".to_string() }
fn default_system_instruction() -> String { DEFAULT_SYSTEM_INSTRUCTION.to_string() }
fn default_search_endpoint() -> String { "https://html.duckduckgo.com/html/".to_string() }
fn default_search_max_results() -> usize { 1 }
fn default_fetch_timeout() -> u64 { 10 }
fn default_llm_timeout() -> u64 { 60 }

impl Settings {
    /// Load settings from the process environment
    pub fn load() -> Result<Self> {
        let vars = std::env::vars()
            .filter(|(key, _)| RECOGNIZED_KEYS.contains(&key.as_str()))
            .collect();
        Self::from_vars(vars)
    }

    /// Build settings from an explicit variable map
    ///
    /// Keys are matched exactly; unrecognized keys are dropped.
    pub fn from_vars(mut vars: HashMap<String, String>) -> Result<Self> {
        vars.retain(|key, _| RECOGNIZED_KEYS.contains(&key.as_str()));

        let settings: Settings = Config::builder()
            .add_source(Environment::default().source(Some(vars)))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_address, self.app_port)
    }

    /// Route prefix without a trailing slash; empty means the root
    pub fn route_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// `tracing` filter directive for the configured level
    pub fn log_filter(&self) -> String {
        match self.logging_level.trim().to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            "critical" | "fatal" => "error".to_string(),
            "notset" => "trace".to_string(),
            other => other.to_string(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
