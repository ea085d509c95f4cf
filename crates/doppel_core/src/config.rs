use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoppelConfig {
    pub store: StoreConfig,
    pub twitter: TwitterApiConfig,
    pub linkedin: LinkedinApiConfig,
    pub prompt: PromptConfig,
}

impl DoppelConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: DoppelConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults
    /// with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOPPEL_DB_PATH") {
            self.store.db_path = v;
        }
        if let Ok(v) = std::env::var("RAPIDAPI_HOST") {
            self.twitter.api_host = v;
        }
        if let Ok(v) = std::env::var("RAPIDAPI_KEY") {
            self.twitter.api_key = v;
        }
        if let Ok(v) = std::env::var("LINKEDIN_API_HOST") {
            self.linkedin.api_host = v;
        }
        if let Ok(v) = std::env::var("LINKEDIN_API_KEY") {
            self.linkedin.api_key = v;
        }
        if let Ok(v) = std::env::var("EXTRA_PROMPT_RULES") {
            self.prompt.extra_rules = v;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "doppel.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwitterApiConfig {
    /// RapidAPI host, e.g. "twitter-api45.p.rapidapi.com".
    pub api_host: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkedinApiConfig {
    pub api_host: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Extra rules appended verbatim to every synthesized prompt.
    pub extra_rules: String,
}
