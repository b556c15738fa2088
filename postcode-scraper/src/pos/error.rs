//! Postcode API error types.

/// Errors that can occur when querying the postcode API.
#[derive(Debug, thiserror::Error)]
pub enum PosError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Mock data could not be loaded
    #[error("mock data error: {message}")]
    Mock { message: String },
}
