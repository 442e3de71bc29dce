use crate::evaluator::EvaluationThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

pub const CONFIG_PATH: &str = "data/config.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_openrouter_base_url")]
    pub openrouter_base_url: String,
    #[serde(default = "default_settings_db")]
    pub settings_db: String,
    #[serde(default)]
    pub thresholds: EvaluationThresholds,
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_settings_db() -> String {
    "data/settings.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracing_level: default_tracing_level(),
            user_agent: default_user_agent(),
            openrouter_base_url: default_openrouter_base_url(),
            settings_db: default_settings_db(),
            thresholds: EvaluationThresholds::default(),
        }
    }
}

impl Config {
    /// Load `data/config.yaml` if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config = match fs::read_to_string(CONFIG_PATH) {
            Ok(config_str) => Self::from_yaml(&config_str)?,
            Err(_) => Config::default(),
        };

        config.with_env_overrides(|key| env::var(key).ok())
    }

    pub fn from_yaml(config_str: &str) -> Result<Self> {
        serde_yaml::from_str(config_str).with_context(|| format!("Failed to parse {}", CONFIG_PATH))
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tracing_level) = lookup("TRACING_LEVEL") {
            self.tracing_level = tracing_level;
        }

        if let Some(user_agent) = lookup("USER_AGENT") {
            self.user_agent = user_agent;
        }

        if let Some(base_url) = lookup("OPENROUTER_BASE_URL") {
            self.openrouter_base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(settings_db) = lookup("SETTINGS_DB") {
            self.settings_db = settings_db;
        }

        if let Some(good_max) = lookup("GOOD_MAX_PRICE_PER_SQM") {
            self.thresholds.good_max_price_per_sqm = good_max.parse()
                .context("Failed to parse GOOD_MAX_PRICE_PER_SQM environment variable")?;
        }

        if let Some(ok_max) = lookup("OK_MAX_PRICE_PER_SQM") {
            self.thresholds.ok_max_price_per_sqm = ok_max.parse()
                .context("Failed to parse OK_MAX_PRICE_PER_SQM environment variable")?;
        }

        if self.thresholds.good_max_price_per_sqm > self.thresholds.ok_max_price_per_sqm {
            anyhow::bail!(
                "good_max_price_per_sqm ({}) must not exceed ok_max_price_per_sqm ({})",
                self.thresholds.good_max_price_per_sqm,
                self.thresholds.ok_max_price_per_sqm
            );
        }

        if !self.thresholds.room_size_bounds.windows(2).all(|pair| pair[0] <= pair[1]) {
            anyhow::bail!("room_size_bounds must be in ascending order");
        }

        Ok(self)
    }

    pub fn create_default() -> Result<()> {
        fs::create_dir_all("data")?;

        let config_str = serde_yaml::to_string(&Config::default())?;
        fs::write(CONFIG_PATH, config_str)?;
        Ok(())
    }
}
