//! Error types for the Notistack core.

/// Core error type for Notistack infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum NotistackError {
    /// Invalid account ID.
    #[error("invalid account ID: {0:?} (must be non-empty and free of ':' and '/')")]
    InvalidAccountId(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for Notistack operations.
pub type NotistackResult<T> = Result<T, NotistackError>;
