//! Configuration handling for wip
//!
//! Configuration is stored in `config.toml` inside the data directory:
//!
//! ```toml
//! [limits]
//! max_active = 2
//! stale_days = 14
//!
//! [display]
//! glyphs = "emoji"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Limits;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Unknown config key '{0}' (expected max_active, stale_days or glyphs)")]
    UnknownKey(String),
}

/// How task states are drawn in the terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlyphStyle {
    #[default]
    Emoji,
    Ascii,
}

impl GlyphStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlyphStyle::Emoji => "emoji",
            GlyphStyle::Ascii => "ascii",
        }
    }
}

impl FromStr for GlyphStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emoji" => Ok(GlyphStyle::Emoji),
            "ascii" => Ok(GlyphStyle::Ascii),
            other => Err(ConfigError::Invalid(format!(
                "glyphs must be 'emoji' or 'ascii', got '{}'",
                other
            ))),
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub glyphs: GlyphStyle,
}

/// Full configuration file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub display: DisplayConfig,
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults if absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")?;

        config
            .limits
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }

    /// Saves the configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Returns the current value of a key as text
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "max_active" => Ok(self.limits.max_active.to_string()),
            "stale_days" => Ok(self.limits.stale_days.to_string()),
            "glyphs" => Ok(self.display.glyphs.as_str().to_string()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    /// Sets a key from its text value; the configuration is unchanged on error
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "max_active" => {
                let max_active = parse_count(key, value)?;
                if max_active < 1 {
                    return Err(ConfigError::Invalid(
                        "max_active must be at least 1".to_string(),
                    ));
                }
                self.limits.max_active = max_active;
            }
            "stale_days" => {
                self.limits.stale_days = parse_count(key, value)?;
            }
            "glyphs" => {
                self.display.glyphs = value.parse()?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}
