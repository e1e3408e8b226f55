//! Configuration management for Seven.
//!
//! Loads settings from `$SEVEN_CONFIG` or `<config dir>/seven/config.toml`,
//! falling back to defaults when the file is missing or broken.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment override for the config file location
pub const CONFIG_ENV: &str = "SEVEN_CONFIG";

const CONFIG_DIR: &str = "seven";
const CONFIG_FILE: &str = "config.toml";

/// Why a config file was not used
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Who the assistant is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Named when the user asks who made the assistant
    #[serde(default = "default_creator")]
    pub creator: String,
}

fn default_persona_name() -> String {
    "Seven".to_string()
}

fn default_creator() -> String {
    "Mani".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            creator: default_creator(),
        }
    }
}

/// Inference endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,

    /// Output tokens for plain chat
    #[serde(default = "default_short_budget")]
    pub short_budget: u32,

    /// Output tokens when web results were added
    #[serde(default = "default_medium_budget")]
    pub medium_budget: u32,

    /// Output tokens for explanations and lists
    #[serde(default = "default_long_budget")]
    pub long_budget: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3:8b-instruct-q4_K_M".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.3
}

fn default_repeat_penalty() -> f32 {
    1.3
}

fn default_short_budget() -> u32 {
    60
}

fn default_medium_budget() -> u32 {
    100
}

fn default_long_budget() -> u32 {
    160
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            repeat_penalty: default_repeat_penalty(),
            short_budget: default_short_budget(),
            medium_budget: default_medium_budget(),
            long_budget: default_long_budget(),
        }
    }
}

impl InferenceConfig {
    /// Timeout clamped to 1-300 seconds
    pub fn effective_timeout(&self) -> u64 {
        self.timeout_secs.clamp(1, 300)
    }
}

/// Speaker defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerConfig {
    /// Display name for the unidentified speaker until they introduce themselves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_name: Option<String>,
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub speaker: SpeakerConfig,
}

impl Config {
    /// Resolve the config file path
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from the default location or use defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a specific path, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load from a specific path, reporting why it failed
    pub fn load_from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default configuration to a file
    pub fn save_default(path: &Path) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }
}
