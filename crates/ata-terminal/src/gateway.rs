/// Remote execution gateway abstraction
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::session::{SessionId, TerminalSize};

/// Result of a successful create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: SessionId,
}

/// One piece of output pushed by the gateway for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub id: SessionId,
    pub data: String,
}

impl OutputChunk {
    pub fn new(id: impl Into<SessionId>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}

pub type OutputSender = mpsc::UnboundedSender<OutputChunk>;
pub type OutputReceiver = mpsc::UnboundedReceiver<OutputChunk>;

/// Create the push channel that carries output from a gateway to the registry
pub fn output_channel() -> (OutputSender, OutputReceiver) {
    mpsc::unbounded_channel()
}

/// Service that spawns and drives the actual terminal processes.
/// Every call is keyed by the id the service issued at creation.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Create a new remote terminal, optionally sized
    async fn create(&self, size: Option<TerminalSize>) -> Result<CreatedSession, GatewayError>;

    /// Close a remote terminal
    async fn close(&self, id: &SessionId) -> Result<(), GatewayError>;

    /// Send a command line to a remote terminal
    async fn send_command(&self, id: &SessionId, command: &str) -> Result<(), GatewayError>;

    /// Propagate new viewport dimensions
    async fn resize(&self, id: &SessionId, size: TerminalSize) -> Result<(), GatewayError>;

    /// Check that the service is reachable
    async fn health_check(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Gateway name for debugging
    fn gateway_name(&self) -> &str;
}
