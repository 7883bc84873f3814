//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Serial link configuration
    #[serde(default)]
    pub serial: SerialConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Serial port configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Serial port path
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Contrast restored by `on` until one is set
    #[serde(default = "default_contrast")]
    pub contrast: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            contrast: default_contrast(),
        }
    }
}

// Default value functions
fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud() -> u32 {
    picaso_lcd::DEFAULT_BAUD_RATE
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_contrast() -> u16 {
    picaso_lcd::lcd::DEFAULT_CONTRAST
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }
}
