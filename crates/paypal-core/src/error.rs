//! # PayPal Error Types
//!
//! Typed error handling for the PayPal client.
//! Every client operation returns `Result<T, PayPalError>`; remote API
//! failures are normally returned as data inside [`ApiResult`](crate::ApiResult)
//! and only become a `PayPalError` when a caller asks for it.

use crate::result::RemoteError;
use std::time::Duration;
use thiserror::Error;

/// Core error type for all client operations
#[derive(Debug, Error)]
pub enum PayPalError {
    /// Configuration errors (missing credentials, invalid environment)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller supplied data the client refuses to send
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The token endpoint rejected the credentials
    #[error("Authentication failed [{error}]: {description}")]
    Authentication { error: String, description: String },

    /// Network/HTTP failure before a response was obtained
    #[error("Transport error: {0}")]
    Transport(String),

    /// The caller's deadline elapsed before the call finished
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A structured error returned by the PayPal API
    #[error("Remote API error: {0}")]
    Remote(RemoteError),

    /// Non-JSON response on an error status
    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PayPalError {
    /// Returns true if a caller could reasonably retry.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            PayPalError::Transport(_) | PayPalError::Timeout(_) => true,
            PayPalError::Remote(remote) => remote.status == 429 || remote.status >= 500,
            PayPalError::UnexpectedResponse { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PayPalError::Configuration(_) => 500,
            PayPalError::InvalidRequest(_) => 400,
            PayPalError::Authentication { .. } => 502,
            PayPalError::Transport(_) => 503,
            PayPalError::Timeout(_) => 504,
            PayPalError::Remote(remote) if (400..600).contains(&remote.status) => remote.status,
            PayPalError::Remote(_) => 502,
            PayPalError::UnexpectedResponse { .. } => 502,
            PayPalError::Serialization(_) => 500,
        }
    }

    pub(crate) fn serialization(err: impl std::fmt::Display) -> Self {
        PayPalError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PayPalError {
    fn from(err: serde_json::Error) -> Self {
        PayPalError::serialization(err)
    }
}

/// Result type alias for client operations
pub type PayPalResult<T> = Result<T, PayPalError>;
