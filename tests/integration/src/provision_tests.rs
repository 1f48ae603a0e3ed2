//! Provisioning scenarios run end to end: node config -> plan -> files on
//! disk -> merged RKE2 config.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;
use rke2_content::merge_directory;
use rke2_plan::ProvisioningPlan;
use rke2_provider::{ConfigEmitter, NodeConfig, ProviderPath, StaticProbe, merge_command};
use serde_json::{Value, json};
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/clusters")
        .join(name);
    fs::read_to_string(path).unwrap()
}

fn plan_for(fixture_name: &str) -> ProvisioningPlan {
    let cluster = NodeConfig::from_yaml(&fixture(fixture_name))
        .unwrap()
        .cluster
        .unwrap();
    ConfigEmitter::with_probe(StaticProbe::single(Ipv4Addr::new(10, 0, 0, 20), 24))
        .build_plan(&cluster)
}

/// Perform the plan's file writes under `root`, as the executor would.
fn apply_files(plan: &ProvisioningPlan, root: &Path) {
    for file in plan.files() {
        let target = root.join(file.path.trim_start_matches('/'));
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, &file.content).unwrap();
    }
}

fn merged_config(plan: &ProvisioningPlan) -> (TempDir, Value) {
    let root = TempDir::new().unwrap();
    apply_files(plan, root.path());
    let config_dir = root
        .path()
        .join(ProviderPath::ConfigDir.as_str().trim_start_matches('/'));
    let merged = merge_directory(&config_dir).unwrap();
    (root, merged)
}

#[test]
fn worker_joins_control_plane() {
    let plan = plan_for("worker.yaml");
    let (_root, merged) = merged_config(&plan);

    assert_eq!(
        merged,
        json!({
            "node-label": ["zone=eu-1a"],
            "server": "https://10.0.0.1:9345",
            "tls-san": ["10.0.0.1"],
            "token": "K10example::server:secret",
        })
    );
}

#[test]
fn init_node_with_proxy() {
    let plan = plan_for("init-proxy.yaml");
    let (root, merged) = merged_config(&plan);

    assert_eq!(merged["server"], "");
    assert_eq!(merged["cluster-cidr"], "10.42.0.0/16");
    assert_eq!(merged["tls-san"], json!(["lb.example.com", "cp.example.com"]));

    let env_file = root.path().join("etc/default/rke2-server");
    let env = fs::read_to_string(env_file).unwrap();
    let no_proxy = "10.42.0.0/16,10.43.0.0/16,10.0.0.20/24,.svc,.svc.cluster,.svc.cluster.local,registry.internal";
    assert_eq!(
        env,
        format!(
            "HTTP_PROXY=http://proxy.example.com:3128\n\
             CONTAINERD_HTTP_PROXY=http://proxy.example.com:3128\n\
             HTTPS_PROXY=http://proxy.example.com:3128\n\
             CONTAINERD_HTTPS_PROXY=http://proxy.example.com:3128\n\
             NO_PROXY={no_proxy}\n\
             CONTAINERD_NO_PROXY={no_proxy}"
        )
    );
}

#[test]
fn control_plane_imports_images_before_restart() {
    let plan = plan_for("controlplane-images.yaml");
    let stages = plan.phase("boot.before");

    assert_eq!(stages.len(), 4);
    assert_eq!(stages[1].guard.as_deref(), Some("[  -d /var/lib/images ]"));
    assert_eq!(stages[2].commands, vec!["sleep 120"]);
    assert_eq!(
        stages[3].commands,
        vec!["systemctl enable rke2-server", "systemctl restart rke2-server"]
    );
}

#[test]
fn rendered_plan_survives_yaml_round_trip() {
    let plan = plan_for("init-proxy.yaml");
    let parsed = ProvisioningPlan::from_yaml(&plan.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed, plan);
}

#[test]
fn missing_cluster_section_yields_nothing() {
    let config = NodeConfig::from_yaml(&fixture("no-cluster.yaml")).unwrap();
    assert!(config.cluster.is_none());
}

fn jq_available() -> bool {
    Command::new("jq")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Run the plan's merge command over `config_dir` and parse what it wrote.
fn merge_with_jq(config_dir: &Path) -> Value {
    let output = config_dir.with_file_name("config.yaml");
    let command = merge_command(
        &config_dir.display().to_string(),
        &output.display().to_string(),
    );
    let status = Command::new("sh").arg("-c").arg(&command).status().unwrap();
    assert!(status.success(), "{command}");
    serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap()
}

#[test]
fn node_merge_command_layers_like_native_merge() {
    if !jq_available() {
        eprintln!("jq not installed, skipping");
        return;
    }
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config.d");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("90_userdata.yaml"),
        r#"{"token":"user","kubelet":{"a":1,"b":2},"n":1,"tls-san":["a"],"keep":"x"}"#,
    )
    .unwrap();
    fs::write(
        config_dir.join("99_userdata.yaml"),
        r#"{"token":"provider","kubelet":{"b":3},"n":2,"tls-san":["b"],"keep":null}"#,
    )
    .unwrap();

    let expected = json!({
        "keep": "x",
        "kubelet": {"b": 3},
        "n": 2,
        "tls-san": ["a", "b"],
        "token": "provider",
    });
    assert_eq!(merge_directory(&config_dir).unwrap(), expected);
    assert_eq!(merge_with_jq(&config_dir), expected);
}

#[test]
fn node_merge_command_matches_native_merge_for_plan() {
    if !jq_available() {
        eprintln!("jq not installed, skipping");
        return;
    }
    let plan = plan_for("init-proxy.yaml");
    let root = TempDir::new().unwrap();
    apply_files(&plan, root.path());
    let config_dir = root
        .path()
        .join(ProviderPath::ConfigDir.as_str().trim_start_matches('/'));

    assert_eq!(merge_with_jq(&config_dir), merge_directory(&config_dir).unwrap());
}
