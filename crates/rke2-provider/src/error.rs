//! Error types for rke2-provider

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown node role: {role} (expected init, controlplane or worker)")]
    UnknownRole { role: String },

    #[error("Invalid node config: {0}")]
    NodeConfig(#[from] serde_yaml::Error),

    #[error("Cluster option {field} must be a string, found {found}")]
    InvalidOptionField { field: String, found: String },

    #[error("Cluster options are not a JSON object: {message}")]
    InvalidOptions { message: String },

    #[error("Failed to enumerate network interfaces: {0}")]
    Probe(#[from] nix::Error),
}
