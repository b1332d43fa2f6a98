use std::sync::Arc;

use ata_settings::TerminalSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::buffer::OutputBuffer;
use super::{DEFAULT_COLS, DEFAULT_ROWS};

/// Opaque session identifier issued by the gateway
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
    pub rows: u16,
    pub cols: u16,
}

impl TerminalSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl std::fmt::Display for TerminalSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Snapshot of a session handed out to callers
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub title: String,
    pub rows: u16,
    pub cols: u16,
    pub buffer: String,
    pub dropped_bytes: usize,
    pub settings: TerminalSettings,
    pub created_at: DateTime<Utc>,
}

/// A terminal session tracked by the registry
pub(crate) struct Session {
    pub(crate) id: SessionId,
    pub(crate) title: String,
    pub(crate) buffer: OutputBuffer,
    pub(crate) size: TerminalSize,
    pub(crate) settings: TerminalSettings,
    pub(crate) created_at: DateTime<Utc>,
    // Serializes gateway calls targeting this session
    op_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        title: String,
        size: TerminalSize,
        settings: TerminalSettings,
        buffer_limit: Option<usize>,
    ) -> Self {
        Self {
            id,
            title,
            buffer: OutputBuffer::new(buffer_limit),
            size,
            settings,
            created_at: Utc::now(),
            op_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub(crate) fn op_lock(&self) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(&self.op_lock)
    }

    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            rows: self.size.rows,
            cols: self.size.cols,
            buffer: self.buffer.as_str().to_string(),
            dropped_bytes: self.buffer.dropped_bytes(),
            settings: self.settings.clone(),
            created_at: self.created_at,
        }
    }
}
