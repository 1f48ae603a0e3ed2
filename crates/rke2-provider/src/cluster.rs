//! Cluster parameters delivered by the host runtime.
//!
//! The node's cloud-config carries a `cluster:` section:
//!
//! ```yaml
//! cluster:
//!   cluster_token: secret
//!   control_plane_host: 10.0.0.1
//!   role: worker
//!   config: |
//!     node-label:
//!       - zone=a
//!   env:
//!     HTTP_PROXY: http://proxy:3128
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{CLUSTER_ROOT_PATH, ProviderPath, SystemService};
use crate::{Error, Result};

/// A node's function in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// First control-plane node, bootstraps the cluster
    #[default]
    Init,
    /// Additional control-plane member
    ControlPlane,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ControlPlane => "controlplane",
            Self::Worker => "worker",
        }
    }

    /// Service the node runs: control-plane roles run the server.
    pub fn system_service(&self) -> SystemService {
        match self {
            Self::Init | Self::ControlPlane => SystemService::Server,
            Self::Worker => SystemService::Agent,
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "init" => Ok(Self::Init),
            "controlplane" => Ok(Self::ControlPlane),
            "worker" => Ok(Self::Worker),
            other => Err(Error::UnknownRole {
                role: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the emitter needs to know about one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClusterDescriptor {
    #[serde(default, rename = "cluster_token")]
    pub token: String,

    #[serde(default)]
    pub control_plane_host: String,

    #[serde(default)]
    pub role: Role,

    /// Free-form RKE2 options as YAML or JSON text
    #[serde(default, rename = "config")]
    pub options: String,

    /// Proxy-related environment (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`)
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub provider_options: BTreeMap<String, String>,

    #[serde(default)]
    pub import_local_images: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_images_path: Option<String>,
}

impl ClusterDescriptor {
    pub fn new(role: Role, token: impl Into<String>, control_plane_host: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            control_plane_host: control_plane_host.into(),
            role,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_provider_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.provider_options.insert(key.into(), value.into());
        self
    }

    pub fn with_local_images(mut self, path: Option<&str>) -> Self {
        self.import_local_images = true;
        self.local_images_path = path.map(str::to_string);
        self
    }

    /// Free-form options, `{}` when none were given.
    pub fn options_or_default(&self) -> &str {
        if self.options.is_empty() {
            "{}"
        } else {
            &self.options
        }
    }

    /// Prefix for absolute paths when the host filesystem is mounted elsewhere.
    pub fn cluster_root_path(&self) -> &str {
        self.provider_options
            .get(CLUSTER_ROOT_PATH)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Image directory to import, `None` when importing is disabled.
    pub fn local_images_dir(&self) -> Option<&str> {
        if !self.import_local_images {
            return None;
        }
        match self.local_images_path.as_deref() {
            Some(path) if !path.is_empty() => Some(path),
            _ => Some(ProviderPath::LocalImages.as_str()),
        }
    }
}

/// The subset of a node cloud-config this provider reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub cluster: Option<ClusterDescriptor>,
}

impl NodeConfig {
    pub fn from_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("init", Role::Init)]
    #[case("", Role::Init)]
    #[case("controlplane", Role::ControlPlane)]
    #[case("worker", Role::Worker)]
    fn parses_roles(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(input.parse::<Role>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "master".parse::<Role>().unwrap_err();
        assert!(matches!(err, Error::UnknownRole { ref role } if role == "master"));
    }

    #[rstest]
    #[case(Role::Init, SystemService::Server)]
    #[case(Role::ControlPlane, SystemService::Server)]
    #[case(Role::Worker, SystemService::Agent)]
    fn role_selects_service(#[case] role: Role, #[case] service: SystemService) {
        assert_eq!(role.system_service(), service);
    }

    #[test]
    fn parses_cluster_section() {
        let yaml = r#"
#cloud-config
hostname: node-1
cluster:
  cluster_token: secret
  control_plane_host: 10.0.0.1
  role: worker
  config: |
    node-label:
      - zone=a
  env:
    HTTP_PROXY: http://proxy:3128
  provider_options:
    cluster_root_path: /persistent
  import_local_images: true
"#;
        let config = NodeConfig::from_yaml(yaml).unwrap();
        let cluster = config.cluster.unwrap();

        assert_eq!(cluster.token, "secret");
        assert_eq!(cluster.control_plane_host, "10.0.0.1");
        assert_eq!(cluster.role, Role::Worker);
        assert_eq!(cluster.options, "node-label:\n  - zone=a\n");
        assert_eq!(cluster.env["HTTP_PROXY"], "http://proxy:3128");
        assert_eq!(cluster.cluster_root_path(), "/persistent");
        assert_eq!(cluster.local_images_dir(), Some("/opt/content/images"));
    }

    #[test]
    fn missing_cluster_section_is_none() {
        let config = NodeConfig::from_yaml("hostname: node-1\n").unwrap();
        assert!(config.cluster.is_none());
        assert!(NodeConfig::from_yaml("").unwrap().cluster.is_none());
    }

    #[test]
    fn missing_role_defaults_to_init() {
        let config = NodeConfig::from_yaml("cluster:\n  cluster_token: t\n").unwrap();
        assert_eq!(config.cluster.unwrap().role, Role::Init);
    }

    #[test]
    fn unknown_role_fails_to_parse() {
        let err = NodeConfig::from_yaml("cluster:\n  role: master\n").unwrap_err();
        assert!(err.to_string().contains("master"));
    }

    #[test]
    fn options_default_to_empty_mapping() {
        let cluster = ClusterDescriptor::new(Role::Init, "t", "h");
        assert_eq!(cluster.options_or_default(), "{}");
        assert_eq!(cluster.with_options("a: 1").options_or_default(), "a: 1");
    }

    #[rstest]
    #[case(None, Some("/opt/content/images"))]
    #[case(Some(""), Some("/opt/content/images"))]
    #[case(Some("/data/images"), Some("/data/images"))]
    fn local_images_dir_defaults(#[case] path: Option<&str>, #[case] expected: Option<&str>) {
        let cluster = ClusterDescriptor::new(Role::Worker, "t", "h").with_local_images(path);
        assert_eq!(cluster.local_images_dir(), expected);
    }

    #[test]
    fn local_images_disabled_by_default() {
        let cluster = ClusterDescriptor::new(Role::Worker, "t", "h");
        assert_eq!(cluster.local_images_dir(), None);
    }
}
