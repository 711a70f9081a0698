//! Error types for bank-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the synchronization engine
    #[error(transparent)]
    Sync(#[from] bank_sync::Error),

    /// Error from the record store
    #[error(transparent)]
    Registry(#[from] bank_registry::Error),

    /// Error from the group ledger
    #[error(transparent)]
    Groups(#[from] bank_groups::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
