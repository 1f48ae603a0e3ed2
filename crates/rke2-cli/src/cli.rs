//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rke2_provider::ProviderPath;

use crate::logging::{DEFAULT_LOG_FILE, LoggingConfig};

/// RKE2 cluster provider - turns Kairos cluster settings into boot stages
#[derive(Parser, Debug)]
#[command(name = "provider-rke2")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log file path, "-" for stderr
    #[arg(long, global = true, env = "PROVIDER_RKE2_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new(&self.log_file, self.verbose)
    }
}

/// Host events plus debugging helpers
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Handle the cluster provisioning event (event JSON on stdin)
    #[command(name = "cluster.provision")]
    ClusterProvision,

    /// Handle the cluster reset event (event JSON on stdin)
    #[command(name = "cluster.reset")]
    ClusterReset,

    /// Render the plan for a node config file
    ///
    /// Examples:
    ///   provider-rke2 plan node.yaml
    ///   cat node.yaml | provider-rke2 plan -
    Plan {
        /// Node cloud-config with a `cluster:` section, "-" for stdin
        file: PathBuf,
    },

    /// Merge the config fragments in a directory the way the node does
    Merge {
        /// Fragment directory
        #[arg(default_value = ProviderPath::ConfigDir.as_str())]
        dir: PathBuf,

        /// Write the merged config here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Any other host event
    #[command(external_subcommand)]
    Other(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_event_names() {
        let cli = Cli::try_parse_from(["provider-rke2", "cluster.provision"]).unwrap();
        assert_eq!(cli.command, Commands::ClusterProvision);

        let cli = Cli::try_parse_from(["provider-rke2", "cluster.reset"]).unwrap();
        assert_eq!(cli.command, Commands::ClusterReset);
    }

    #[test]
    fn unknown_events_are_captured() {
        let cli = Cli::try_parse_from(["provider-rke2", "agent.bootstrap"]).unwrap();
        assert_eq!(cli.command, Commands::Other(vec!["agent.bootstrap".to_string()]));
    }

    #[test]
    fn merge_defaults_to_config_dir() {
        let cli = Cli::try_parse_from(["provider-rke2", "merge"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Merge {
                dir: PathBuf::from("/etc/rancher/rke2/config.d"),
                output: None,
            }
        );
    }

    #[test]
    fn log_file_flag_is_global() {
        let cli =
            Cli::try_parse_from(["provider-rke2", "plan", "node.yaml", "--log-file", "-"]).unwrap();
        assert_eq!(cli.log_file, PathBuf::from("-"));
        assert!(cli.logging_config().file.is_none());
    }
}
