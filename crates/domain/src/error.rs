//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier is empty or whitespace only. Carries the identifier kind.
    #[error("invalid identifier: {0} must not be empty")]
    InvalidIdentifier(&'static str),

    /// A record could not be decoded from its JSON representation.
    #[error("{0}")]
    InvalidFormat(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl DomainError {
    /// Builds the format error reported for a missing or malformed field.
    #[must_use]
    pub fn field(description: &str) -> Self {
        Self::InvalidFormat(format!("{description} invalid or missing"))
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_message() {
        let error = DomainError::field("Model identification");
        assert_eq!(error.to_string(), "Model identification invalid or missing");
    }

    #[test]
    fn identifier_error_names_kind() {
        let error = DomainError::InvalidIdentifier("ModelId");
        assert_eq!(error.to_string(), "invalid identifier: ModelId must not be empty");
    }
}
