use thiserror::Error;

/// Application-wide error types for parley.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (talking to the upstream API).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Upstream API returned a non-success status or an unusable body.
    #[error("Upstream error (HTTP {status_code}): {message}")]
    Upstream { message: String, status_code: u16 },

    /// Client request rejected before any outbound call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if the failure came from the upstream side rather than
    /// from the caller's request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Upstream { .. }
                | AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::RateLimitExceeded
        )
    }
}
