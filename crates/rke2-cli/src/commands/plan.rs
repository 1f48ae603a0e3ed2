//! Plan command implementation

use std::io::{self, Read};
use std::path::Path;

use rke2_provider::{ConfigEmitter, InterfaceProbe, NodeConfig};

use crate::error::{CliError, Result};

/// Render the plan for the node config at `path` ("-" reads stdin).
pub fn run_plan(path: &Path) -> Result<()> {
    let source = read_source(path)?;
    let yaml = render_plan(&source, &ConfigEmitter::new())
        .map_err(|e| match e {
            CliError::User { message } => CliError::user(format!("{}: {message}", path.display())),
            other => other,
        })?;
    print!("{yaml}");
    Ok(())
}

/// Plan YAML for a node cloud-config.
pub fn render_plan<P: InterfaceProbe>(source: &str, emitter: &ConfigEmitter<P>) -> Result<String> {
    let cluster = NodeConfig::from_yaml(source)?
        .cluster
        .ok_or_else(|| CliError::user("no cluster section in node config"))?;
    Ok(emitter.build_plan(&cluster).to_yaml()?)
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rke2_provider::StaticProbe;

    #[test]
    fn renders_init_plan() {
        let yaml = render_plan(
            "cluster:\n  cluster_token: t\n  control_plane_host: 10.0.0.1\n  role: init\n",
            &ConfigEmitter::with_probe(StaticProbe::default()),
        )
        .unwrap();

        assert!(yaml.contains("systemctl enable rke2-server"));
        assert!(yaml.contains("99_userdata.yaml"));
    }

    #[test]
    fn missing_cluster_section_is_a_user_error() {
        let err = render_plan("hostname: x\n", &ConfigEmitter::with_probe(StaticProbe::default()))
            .unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }
}
