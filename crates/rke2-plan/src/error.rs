//! Error types for rke2-plan

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to render plan: {0}")]
    Render(#[from] serde_yaml::Error),
}
