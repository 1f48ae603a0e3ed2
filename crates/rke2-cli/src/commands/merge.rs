//! Merge command implementation

use std::path::Path;

use colored::Colorize;
use rke2_content::{io::write_atomic, merge_directory};

use crate::error::Result;

/// The merged config holds the cluster token.
const MERGED_CONFIG_MODE: u32 = 0o600;

/// Merge the fragments in `dir`, printing YAML or writing it to `output`.
pub fn run_merge(dir: &Path, output: Option<&Path>) -> Result<()> {
    let yaml = merged_yaml(dir)?;

    match output {
        Some(path) => {
            write_atomic(path, yaml.as_bytes(), MERGED_CONFIG_MODE)?;
            tracing::info!(dir = %dir.display(), output = %path.display(), "Merged config fragments");
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{yaml}"),
    }
    Ok(())
}

/// YAML rendering of the merged fragments in `dir`.
pub fn merged_yaml(dir: &Path) -> Result<String> {
    let merged = merge_directory(dir)?;
    Ok(serde_yaml::to_string(&merged)?)
}
