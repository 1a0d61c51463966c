//! Larder error types

use std::time::Duration;

/// Larder error types
#[derive(Debug, thiserror::Error)]
pub enum LarderError {
    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Soft errors
    #[error("upstream returned no results")]
    EmptyResponse,

    // Configuration errors
    #[error("no image search provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The image cache store could not be read or written.
    ///
    /// Never converted into a placeholder: a failing store fails the
    /// whole resolution request.
    #[error("store error: {0}")]
    Store(String),
}

impl LarderError {
    /// Whether this error came from the image search side of a resolution.
    ///
    /// Upstream errors degrade to placeholder images; everything else is
    /// propagated to the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LarderError::Http(_)
                | LarderError::Api { .. }
                | LarderError::RateLimited { .. }
                | LarderError::AuthenticationFailed
                | LarderError::Timeout(_)
                | LarderError::Json(_)
                | LarderError::EmptyResponse
                | LarderError::NoProvider
        )
    }
}

/// Result type alias for Larder operations
pub type Result<T> = std::result::Result<T, LarderError>;
