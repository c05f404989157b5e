//! Common result and error types for the Skema database.

/// The standard result type for fallible internal operations.
///
/// Name and path lookups return `Option`, never `Err`: a missing library or
/// cell is an expected outcome, not a failure. `Err` is reserved for
/// violated internal invariants (a bug in the database core).
pub type SkemaResult<T> = Result<T, InternalError>;

/// An internal invariant violation inside the database core.
///
/// These should never occur during normal operation of a well-behaved
/// caller; one surfacing means a logic error in the core itself.
#[derive(Debug, thiserror::Error)]
#[error("internal database error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
