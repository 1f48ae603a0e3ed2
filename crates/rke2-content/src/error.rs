//! Error types for rke2-content

use std::path::PathBuf;

/// Result type for rke2-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting or merging config fragments
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Fragment {name} is not a mapping (found {found})")]
    NotAMapping { name: String, found: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML content: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
