//! Common error types used throughout refreshsparse.
//!
//! Classification itself never fails; errors come from the catalog (database
//! or HTTP), from the refresh call, and from cooperative cancellation.

/// Common error type for refreshsparse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A request to the media server failed at the transport or HTTP level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The external refresh of a single item failed.
    #[error("Refresh of {item} failed: {message}")]
    Refresh {
        /// Display name of the item being refreshed.
        item: String,
        /// Human-readable error description.
        message: String,
    },

    /// The run was cancelled by its host.
    #[error("Operation cancelled")]
    Cancelled,

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Http error.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new Refresh error for the named item.
    pub fn refresh(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refresh {
            item: item.into(),
            message: message.into(),
        }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
