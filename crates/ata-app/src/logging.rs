//! Tracing setup
//!
//! Log output goes to a file so it never interleaves with the interactive
//! terminal. The level comes from `ATA_LOG` (full `EnvFilter` syntax) or the
//! configured level.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::{ata_home, ENV_LOG};

pub fn default_log_path() -> PathBuf {
    ata_home().join("logs").join("ata.log")
}

/// Filter for `level`, letting `ATA_LOG` take precedence when set
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `log_path` (append, no ANSI)
pub fn init(level: &str, log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!(log_file = %log_path.display(), "ata starting");
    Ok(())
}
