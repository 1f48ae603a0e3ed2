//! RKE2 cluster provider for Kairos
//!
//! Invoked by the host runtime once per cluster event; turns the node's
//! cluster settings into the boot stages that configure and start RKE2.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.logging_config()) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }

    let span = tracing::info_span!("provider", version = env!("CARGO_PKG_VERSION"));
    let _guard = span.enter();

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::ClusterProvision => commands::run_event(commands::event::CLUSTER_PROVISION),
        Commands::ClusterReset => commands::run_event(commands::event::CLUSTER_RESET),
        Commands::Other(args) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            commands::run_event(name)
        }
        Commands::Plan { file } => commands::run_plan(&file),
        Commands::Merge { dir, output } => commands::run_merge(&dir, output.as_deref()),
    }
}
