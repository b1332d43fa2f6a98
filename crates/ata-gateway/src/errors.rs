use ata_terminal::GatewayError;
use thiserror::Error;

use crate::wire::ErrorBody;

pub const NETWORK_ERROR: &str = "network connection error";
pub const TIMEOUT_ERROR: &str = "request timed out";

/// Problems constructing an [`HttpGateway`](crate::HttpGateway)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{0}': expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Classify a failure that happened before any response arrived
pub(crate) fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Unavailable(TIMEOUT_ERROR.to_string())
    } else {
        GatewayError::Unavailable(NETWORK_ERROR.to_string())
    }
}

/// Turn a reply other than 200/201 into a user-facing message
pub(crate) fn status_error(status: u16, body: &str) -> GatewayError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let detail = parsed.message.or(parsed.detail);

    let message = match status {
        400 => format!(
            "invalid request parameters: {}",
            detail.as_deref().unwrap_or("bad request")
        ),
        401 => "authentication failed".to_string(),
        403 => "access to the resource is forbidden".to_string(),
        404 => "requested resource does not exist".to_string(),
        500 => "internal server error".to_string(),
        200..=299 => detail.unwrap_or_else(|| "unknown error".to_string()),
        _ => "unknown error".to_string(),
    };

    GatewayError::Remote {
        status: Some(status),
        message,
    }
}

/// A 2xx reply whose body could not be understood
pub(crate) fn decode_error(status: u16, err: serde_json::Error) -> GatewayError {
    GatewayError::Remote {
        status: Some(status),
        message: format!("unexpected response from server: {}", err),
    }
}
