use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Router configuration, loadable from `~/.intentgate/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Decision thresholds for the precedence cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Probe confidence at which grounding evidence wins outright
    pub high_retrieval: f64,
    /// Minimum probe confidence to corroborate a retrieval lean
    pub low_retrieval: f64,
    /// Classifier confidence needed for its vote to carry a rule
    pub high_intent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_retrieval: 0.20,
            low_retrieval: 0.12,
            high_intent: 0.65,
        }
    }
}

/// Retrieval probe parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Bounded top-K for the pre-commit retrieval call
    pub top_k: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Boundary timeouts for collaborator calls, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub classifier_ms: u64,
    pub rewriter_ms: u64,
    pub probe_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classifier_ms: 15_000,
            rewriter_ms: 15_000,
            probe_ms: 10_000,
        }
    }
}

impl RouterConfig {
    /// Load configuration from file, creating the default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = RouterConfig::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: RouterConfig = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".intentgate").join("config.toml"))
    }
}
