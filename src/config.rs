//! Configuration management
//!
//! Handles loading and validating client configuration from TOML files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub counterpart: CounterpartConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Counterpart application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CounterpartConfig {
    /// Package name of the counterpart application
    #[serde(default = "default_package_name")]
    pub package_name: String,
    /// Directory holding installed package manifests
    pub manifest_dir: PathBuf,
    /// Minimum counterpart version code this client supports
    #[serde(default)]
    pub min_version: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Package name of the Bazaar store, the usual counterpart
pub const DEFAULT_PACKAGE_NAME: &str = "com.farsitel.bazaar";

// Default value functions
fn default_package_name() -> String {
    DEFAULT_PACKAGE_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(contents).with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.counterpart.package_name.is_empty() {
            anyhow::bail!("counterpart.package_name must not be empty");
        }
        if self.counterpart.manifest_dir.as_os_str().is_empty() {
            anyhow::bail!("counterpart.manifest_dir must not be empty");
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!("logging.format must be \"json\" or \"pretty\"");
        }
        Ok(())
    }
}
