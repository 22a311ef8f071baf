//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant carries a human message and maps to an explicit status code, so
/// the HTTP layer can render it without knowing which operation raised it.
/// Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The referenced identifier does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A submitted or persisted value violates an invariant (e.g. empty name).
    #[error("{0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Status code this failure is tagged with (HTTP semantics, kept as a plain integer).
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::NotFound(_) => 404,
            DomainError::Validation(_) | DomainError::InvalidId(_) => 400,
        }
    }
}
