use thiserror::Error;

use crate::session::SessionId;

/// Failure reported by the remote execution gateway
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The service could not be reached (connect failure, timeout)
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    /// The service answered a well-formed request with a failure
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },
}

impl GatewayError {
    pub fn remote(message: impl Into<String>) -> Self {
        GatewayError::Remote {
            status: None,
            message: message.into(),
        }
    }
}

/// Errors surfaced by session registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("gateway error: {message}")]
    GatewayError {
        status: Option<u16>,
        message: String,
    },
    #[error("session '{0}' not found")]
    SessionNotFound(SessionId),
    #[error("no active session")]
    NoActiveSession,
    #[error("command is empty")]
    EmptyCommand,
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unavailable(reason) => SessionError::GatewayUnavailable(reason),
            GatewayError::Remote { status, message } => SessionError::GatewayError { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
