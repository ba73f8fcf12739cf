//! Error types for the mixtape service.

use thiserror::Error;

/// Main error type for all mixtape operations.
#[derive(Debug, Error)]
pub enum MixtapeError {
    /// A required field is missing or malformed in a request payload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid credential.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authenticated, but not permitted to perform the operation.
    /// Distinct from [`MixtapeError::NotFound`]: the record exists but is
    /// not visible or writable for this requester.
    #[error("Access denied: {0}")]
    Authorization(String),

    /// The referenced mixtape does not exist.
    #[error("Mixtape not found: {0}")]
    NotFound(String),

    /// An external dependency (identity provider, document store, music API)
    /// failed or returned a malformed response.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl MixtapeError {
    /// HTTP status code this error maps to at the handler boundary.
    pub fn status(&self) -> u16 {
        match self {
            MixtapeError::Validation(_) => 400,
            MixtapeError::Authentication(_) => 401,
            MixtapeError::Authorization(_) => 403,
            MixtapeError::NotFound(_) => 404,
            MixtapeError::Upstream(_) | MixtapeError::Request(_) | MixtapeError::Parse(_) => 500,
        }
    }
}

/// Result type alias for mixtape operations.
pub type Result<T> = std::result::Result<T, MixtapeError>;
