//! Role-derived RKE2 settings ("provider config")

use serde::Serialize;

use crate::cluster::{ClusterDescriptor, Role};
use crate::constants::REGISTRATION_PORT;

/// Settings every node gets regardless of user options.
///
/// `server` is empty for the init node and points at the control plane's
/// registration endpoint for every other role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleConfig {
    pub token: String,
    pub server: String,
    #[serde(rename = "tls-san")]
    pub tls_san: Vec<String>,
}

impl RoleConfig {
    pub fn for_cluster(cluster: &ClusterDescriptor) -> Self {
        let server = match cluster.role {
            Role::Init => String::new(),
            Role::ControlPlane | Role::Worker => {
                format!("https://{}:{}", cluster.control_plane_host, REGISTRATION_PORT)
            }
        };

        Self {
            token: cluster.token.clone(),
            server,
            tls_san: vec![cluster.control_plane_host.clone()],
        }
    }

    /// YAML rendering; empty when serialization fails.
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(self).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not render provider config");
            String::new()
        })
    }
}
