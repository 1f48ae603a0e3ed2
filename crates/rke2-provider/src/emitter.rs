//! Config emitter: cluster descriptor in, provisioning plan out.

use rke2_content::canonical_json;
use rke2_plan::{FileWrite, ProvisioningPlan, Stage};

use crate::cluster::ClusterDescriptor;
use crate::constants::{
    BOOT_BEFORE, EXTRACT_WAIT_SECS, FILE_PERMISSIONS, PLAN_NAME, PROVIDER_OPTIONS_FILE,
    ProviderPath, USER_OPTIONS_FILE,
};
use crate::network::{InterfaceProbe, SystemProbe};
use crate::proxy::ProxySettings;
use crate::role::RoleConfig;

pub const INSTALL_STAGE: &str = "Install RKE2 Configuration Files";
pub const WAIT_STAGE: &str = "Waiting to finish extracting content";
pub const ENABLE_STAGE: &str = "Enable Systemd Services";

/// Builds provisioning plans, probing local interfaces through `P`.
#[derive(Debug, Default, Clone)]
pub struct ConfigEmitter<P = SystemProbe> {
    probe: P,
}

impl ConfigEmitter<SystemProbe> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: InterfaceProbe> ConfigEmitter<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Produce the plan for one node.
    ///
    /// Never fails: malformed options, conversion errors and probe failures
    /// are logged and degrade to empty contributions.
    pub fn build_plan(&self, cluster: &ClusterDescriptor) -> ProvisioningPlan {
        let service = cluster.role.system_service();
        tracing::info!(role = %cluster.role, %service, "Building provisioning plan");

        let provider_config = RoleConfig::for_cluster(cluster).to_yaml();
        let user_options = canonical_json(cluster.options_or_default());
        let options = canonical_json(&provider_config);

        let proxy = ProxySettings::derive(&user_options, &cluster.env, &self.probe);

        let mut files = vec![
            FileWrite::new(
                ProviderPath::ConfigDir.join(USER_OPTIONS_FILE),
                FILE_PERMISSIONS,
                user_options,
            ),
            FileWrite::new(
                ProviderPath::ConfigDir.join(PROVIDER_OPTIONS_FILE),
                FILE_PERMISSIONS,
                options,
            ),
        ];
        if !proxy.is_empty() {
            tracing::debug!(
                proxy_configured = proxy.is_proxy_configured(),
                "Writing proxy environment"
            );
            files.push(FileWrite::new(
                ProviderPath::ContainerdEnvDir.join(service.as_str()),
                FILE_PERMISSIONS,
                proxy.to_env_file(),
            ));
        }

        let mut plan = ProvisioningPlan::new(PLAN_NAME);
        plan.push_stage(
            BOOT_BEFORE,
            Stage::named(INSTALL_STAGE)
                .with_files(files)
                .with_command(merge_command(
                    ProviderPath::ConfigDir.as_str(),
                    ProviderPath::FinalConfig.as_str(),
                )),
        );

        if let Some(images) = cluster.local_images_dir() {
            tracing::debug!(path = images, "Scheduling local image import");
            plan.push_stage(
                BOOT_BEFORE,
                Stage::default()
                    .with_command(format!(
                        "/bin/sh {}{} {} > {}",
                        cluster.cluster_root_path(),
                        ProviderPath::ImportScript,
                        images,
                        ProviderPath::ImportLog,
                    ))
                    .guarded_by(format!("[  -d {images} ]")),
            );
        }

        plan.push_stage(
            BOOT_BEFORE,
            Stage::named(WAIT_STAGE).with_command(format!("sleep {EXTRACT_WAIT_SECS}")),
        );
        plan.push_stage(
            BOOT_BEFORE,
            Stage::named(ENABLE_STAGE)
                .with_command(format!("systemctl enable {service}"))
                .with_command(format!("systemctl restart {service}")),
        );

        plan
    }
}

/// Build a plan using the host's network interfaces.
pub fn build_plan(cluster: &ClusterDescriptor) -> ProvisioningPlan {
    ConfigEmitter::new().build_plan(cluster)
}

/// jq program applying the same layering as `rke2_content::merge_fragments`.
const MERGE_PROGRAM: &str = "reduce (.[] | select(type == \"object\") | to_entries[]) as $e ({}; \
     if ($e.value | type) == \"array\" and (.[$e.key] | type) == \"array\" then .[$e.key] += $e.value \
     elif $e.value == null and has($e.key) then . \
     else .[$e.key] = $e.value end)";

/// Shell command merging every fragment in `config_dir` into `output`.
///
/// Later files win on conflicting keys; array values accumulate across
/// fragments.
pub fn merge_command(config_dir: &str, output: &str) -> String {
    format!("jq -s '{MERGE_PROGRAM}' {config_dir}/*.yaml > {output}")
}
