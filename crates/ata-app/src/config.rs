use anyhow::{Context, Result};
use ata_gateway::GatewayConfig;
use ata_settings::{TerminalSettings, TerminalSettingsPatch};
use ata_terminal::{RegistryOptions, TerminalSize, DEFAULT_BUFFER_LIMIT, DEFAULT_COLS, DEFAULT_ROWS};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

pub const ENV_API_URL: &str = "ATA_API_URL";
pub const ENV_API_TOKEN: &str = "ATA_API_TOKEN";
pub const ENV_LOG: &str = "ATA_LOG";

/// `[registry]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub default_rows: u16,
    pub default_cols: u16,
    /// Per-session output limit; 0 keeps everything
    pub buffer_limit_bytes: usize,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            default_rows: DEFAULT_ROWS,
            default_cols: DEFAULT_COLS,
            buffer_limit_bytes: DEFAULT_BUFFER_LIMIT,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    /// Log file; defaults to ~/.ata/logs/ata.log
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Configuration for the ata client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub gateway: GatewayConfig,
    pub registry: RegistrySection,
    pub logging: LoggingSection,
    /// Terminal display overrides applied over the defaults
    pub terminal: TerminalSettingsPatch,
}

impl ClientConfig {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config file")
    }

    /// Read a config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Resolve the effective configuration: CLI > env > file > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} does not exist", path.display());
                }
                path.clone()
            }
            None => default_config_path(),
        };

        let mut config = Self::from_file(&path)?;
        config.apply_env();
        config.apply_cli(cli);
        Ok(config)
    }

    /// Override from `ATA_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var(ENV_API_URL) {
            if !url.is_empty() {
                self.gateway.base_url = url;
            }
        }
        if let Ok(token) = env::var(ENV_API_TOKEN) {
            if !token.is_empty() {
                self.gateway.token = Some(token);
            }
        }
        if let Ok(level) = env::var(ENV_LOG) {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Override from command-line flags
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.gateway.base_url = url.clone();
        }
        if let Some(token) = &cli.token {
            self.gateway.token = Some(token.clone());
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            default_size: TerminalSize::new(
                self.registry.default_rows.max(1),
                self.registry.default_cols.max(1),
            ),
            buffer_limit: match self.registry.buffer_limit_bytes {
                0 => None,
                limit => Some(limit),
            },
            ..Default::default()
        }
    }

    /// Terminal settings with the `[terminal]` overrides applied
    pub fn terminal_settings(&self) -> TerminalSettings {
        TerminalSettings::default().merged(&self.terminal)
    }

    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(crate::logging::default_log_path)
    }
}

/// Directory holding config and logs: `~/.ata`
pub fn ata_home() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ata")
}

pub fn default_config_path() -> PathBuf {
    ata_home().join("config.toml")
}
