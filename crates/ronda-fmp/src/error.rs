//! Error types for the FMP adapter.

use ronda_traits::RondaError;
use thiserror::Error;

/// Errors that can occur when fetching from FMP or recording its data.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("FMP returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// API returned an error payload with a success status.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Storing the fetched data failed.
    #[error(transparent)]
    Store(#[from] RondaError),
}

impl FmpError {
    /// Worth retrying after a pause: rate limits, transport failures and
    /// server errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded => true,
            Self::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The key has no access to the endpoint or period (HTTP 401 / 403).
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

impl From<FmpError> for RondaError {
    fn from(e: FmpError) -> Self {
        match e {
            FmpError::Store(inner) => inner,
            other => Self::DataFetch(other.to_string()),
        }
    }
}
