use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error raised by ledger operations.
///
/// Every failure is a precondition violation surfaced before any state
/// changes; a call that returns an error leaves nothing half-applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed or missing input to a constructor or setter.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A client, supplier, product, or account key that is not registered.
    #[error("not found: {0}")]
    NotFound(String),

    /// An attempt to create an entity under a key that is already taken.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
