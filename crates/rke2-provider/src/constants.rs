//! Fixed paths, service names and values baked into every plan.

/// Name of the generated plan.
pub const PLAN_NAME: &str = "RKE2 Kairos Cluster Provider";

/// Phase all stages run in, once, before the boot sequence continues.
pub const BOOT_BEFORE: &str = "boot.before";

/// Port the RKE2 server listens on for node registration.
pub const REGISTRATION_PORT: u16 = 9345;

/// In-cluster DNS suffixes that never go through a proxy.
pub const K8S_NO_PROXY: &str = ".svc,.svc.cluster,.svc.cluster.local";

/// Permission bits for every file the plan writes.
pub const FILE_PERMISSIONS: u32 = 0o400;

/// Seconds to wait for asynchronous content extraction.
pub const EXTRACT_WAIT_SECS: u32 = 120;

/// Provider option naming a prefix under which the host filesystem is mounted.
pub const CLUSTER_ROOT_PATH: &str = "cluster_root_path";

/// User options fragment, lower merge precedence.
pub const USER_OPTIONS_FILE: &str = "90_userdata.yaml";

/// Role-derived fragment, highest merge precedence.
pub const PROVIDER_OPTIONS_FILE: &str = "99_userdata.yaml";

/// Fixed filesystem locations used by the generated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPath {
    /// Directory of config fragments merged into the final config
    ConfigDir,
    /// Directory of per-service environment files read by systemd
    ContainerdEnvDir,
    /// Final merged RKE2 config
    FinalConfig,
    /// Default location of bundled container images
    LocalImages,
    /// Image import script shipped with the provider
    ImportScript,
    /// Where the import script output goes
    ImportLog,
}

impl ProviderPath {
    /// Get the string representation of the path.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => "/etc/rancher/rke2/config.d",
            Self::ContainerdEnvDir => "/etc/default",
            Self::FinalConfig => "/etc/rancher/rke2/config.yaml",
            Self::LocalImages => "/opt/content/images",
            Self::ImportScript => "/opt/rke2/scripts/import.sh",
            Self::ImportLog => "/var/log/import.log",
        }
    }

    /// Join a file name onto this path.
    pub fn join(&self, name: &str) -> String {
        format!("{}/{}", self.as_str(), name)
    }
}

impl std::fmt::Display for ProviderPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The systemd unit a node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemService {
    Server,
    Agent,
}

impl SystemService {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "rke2-server",
            Self::Agent => "rke2-agent",
        }
    }
}

impl std::fmt::Display for SystemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_builds_absolute_paths() {
        assert_eq!(
            ProviderPath::ConfigDir.join(USER_OPTIONS_FILE),
            "/etc/rancher/rke2/config.d/90_userdata.yaml"
        );
        assert_eq!(
            ProviderPath::ContainerdEnvDir.join(SystemService::Agent.as_str()),
            "/etc/default/rke2-agent"
        );
    }

    #[test]
    fn permissions_are_owner_read_only() {
        assert_eq!(FILE_PERMISSIONS, 256);
    }
}
