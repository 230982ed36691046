//! Error types for enforced-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the daemon
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from enforced-core
    #[error(transparent)]
    Core(#[from] enforced_core::Error),

    /// Error from enforced-policy
    #[error(transparent)]
    Policy(#[from] enforced_policy::Error),

    /// A global subscriber was already installed
    #[error("Failed to initialise logging: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

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
