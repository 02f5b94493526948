//! Error types for extrepo-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from extrepo-core
    #[error(transparent)]
    Core(#[from] extrepo_core::Error),

    /// JSON output error
    #[error("failed to render JSON: {0}")]
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

macro_rules! from_core {
    ($($error:ty),*) => {
        $(
            impl From<$error> for CliError {
                fn from(error: $error) -> Self {
                    Self::Core(error.into())
                }
            }
        )*
    };
}

from_core!(
    extrepo_core::ResolveError,
    extrepo_core::InstallError,
    extrepo_core::UninstallError,
    extrepo_core::StorageError,
    extrepo_core::ConfigError
);
