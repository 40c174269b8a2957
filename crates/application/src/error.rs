//! Application error types

use lumen_domain::DomainError;
use thiserror::Error;

/// Problems detected before a call reaches the transport.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// No API key is configured.
    #[error("no API key configured")]
    MissingApiKey,
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
