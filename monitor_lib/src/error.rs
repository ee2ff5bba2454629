//! Error types for the Performance Monitoring API client.

use thiserror::Error;

/// Base error type for monitoring API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid client configuration (missing base URL or API key).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Rate limited: {0}")]
    RateLimited(#[from] RateLimitError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The request was sent but no response was received (timeout,
    /// connection refused, connection reset).
    #[error("{0}")]
    Network(String),

    /// The request failed before it was sent (URL/header/body construction).
    #[error("{0}")]
    RequestSetup(String),
}

impl Error {
    /// Uppercase taxonomy name, suitable as an error `type` when reporting
    /// a failure back to the API.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIGURATION_ERROR",
            Error::Auth(_) => "AUTH_FAILED",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::Api(_) => "HTTP_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::RequestSetup(_) => "REQUEST_SETUP_ERROR",
        }
    }
}

/// Raised when the API rejects the request with 401 (invalid or missing key).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

/// Raised when the API rejects the request with 429.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RateLimitError {
    pub message: String,
}

/// Raised when the API returns any other unsuccessful HTTP status.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    pub response_data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(
        message: impl Into<String>,
        status_code: Option<u16>,
        response_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response_data,
        }
    }
}
