mod defaults;
mod prompts;


pub use prompts::Prompts;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AqariError;
use defaults::*;

/// Top-level Aqari configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aqari: AppConfig,
    #[serde(default)]
    pub kb: KbConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub prompts: Prompts,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Knowledge base source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbConfig {
    /// Path to the CSV export of the keyword sheet. Loaded once at startup;
    /// reloading requires a restart.
    #[serde(default = "default_kb_path")]
    pub path: String,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity before an open dialogue is dropped.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
        }
    }
}

/// Intent classifier settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// When false, only the static keyword heuristic runs.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,
    /// API key; empty means read from OPENAI_API_KEY at startup.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_classifier_model")]
    pub model: String,
    /// Hard request timeout. A slow classifier degrades to "no intent",
    /// it never holds a webhook reply hostage.
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_classifier_base_url(),
            api_key: String::new(),
            model: default_classifier_model(),
            timeout_secs: default_classifier_timeout(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// "json" replies with `{"reply": …}`, "text" with a plain-text body.
    #[serde(default = "default_response_format")]
    pub response_format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            response_format: default_response_format(),
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, AqariError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AqariError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| AqariError::Config(format!("failed to parse config: {}", e)))?;

    tracing::info!("Config loaded from {}", path.display());
    Ok(config)
}
