//! Error types for the reconciliation algorithm.

use thiserror::Error;

/// Result type for reconciliation operations.
pub type ReconcileResult<T, E> = Result<T, ReconcileError<E>>;

/// Errors that can occur while reconciling a target collection.
///
/// `E` is the error type produced by the `update`/`create` callbacks.
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError<E> {
    /// A collection was absent or the sources violate the duplicate policy.
    /// Raised before the target collection is touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An `update` or `create` callback failed.
    /// The target collection keeps whatever mutations happened before the failure.
    #[error("callback failed: {0}")]
    Callback(E),
}

impl<E> ReconcileError<E> {
    /// Maps the callback error, leaving `InvalidArgument` as is.
    pub fn map_callback<E2, F>(self, f: F) -> ReconcileError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            ReconcileError::InvalidArgument(message) => ReconcileError::InvalidArgument(message),
            ReconcileError::Callback(error) => ReconcileError::Callback(f(error)),
        }
    }

    /// Returns `true` if the target collection is guaranteed untouched.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ReconcileError::InvalidArgument(_))
    }
}
