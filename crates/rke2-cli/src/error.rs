//! Error types for the provider binary

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Provider(#[from] rke2_provider::Error),

    #[error(transparent)]
    Content(#[from] rke2_content::Error),

    #[error(transparent)]
    Plan(#[from] rke2_plan::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

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
