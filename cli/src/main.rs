mod chart;
mod commands;
mod config;
mod credentials;
mod dropbox;
mod observability;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::chart::SvgChart;
use crate::commands::{cmd_history, cmd_run, cmd_trend, prompt_weight};
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::dropbox::DropboxClient;
use weigh_core::config::RemoteConfig;
use weigh_core::service::Tracker;
use weigh_core::sync::{BlobStore, DirectoryBlobStore};

#[derive(Parser)]
#[command(
    name = "weigh",
    version,
    about = "A small weight tracker with Dropbox sync",
    long_about = "Records one weight per run, keeps the SQLite store in sync with \
                  Dropbox, and refreshes a CSV export and an SVG trend chart.\n\n\
                  Run without a subcommand to be prompted for today's weight."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Work on the local store only, without downloading or uploading
    #[arg(long, global = true)]
    offline: bool,
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a weight without prompting, then refresh the export and chart
    Log {
        /// Weight with exactly one decimal place (e.g. "180.5")
        weight: String,
    },
    /// Show every recorded weight
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weights alongside their 5- and 10-day moving averages
    Trend {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let remote = if cli.offline {
        None
    } else {
        Some(open_remote(&config)?)
    };
    let tracker = Tracker::new(config.tracker.clone(), remote.as_deref());
    let chart = SvgChart::new(config.tracker.chart_path.clone());

    match cli.command {
        None => {
            let input = prompt_weight()?;
            cmd_run(&tracker, &chart, input.as_deref())
        }
        Some(Commands::Log { weight }) => cmd_run(&tracker, &chart, Some(&weight)),
        Some(Commands::History { json }) => cmd_history(&tracker, json),
        Some(Commands::Trend { json }) => cmd_trend(&tracker, json),
    }
}

fn open_remote(config: &Config) -> Result<Box<dyn BlobStore>> {
    match &config.remote {
        RemoteConfig::Dropbox { credential, .. } => {
            let token = CredentialStore::load(&config.credentials_path())?.get(credential)?;
            Ok(Box::new(DropboxClient::new(token)?))
        }
        RemoteConfig::Directory { path, .. } => Ok(Box::new(DirectoryBlobStore::new(path.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_log_with_global_flags() {
        let cli = Cli::try_parse_from(["weigh", "log", "180.5", "--offline", "-v"]).unwrap();
        assert!(cli.offline);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Log { ref weight }) if weight == "180.5"));
    }

    #[test]
    fn test_parse_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["weigh"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn test_parse_history_json() {
        let cli = Cli::try_parse_from(["weigh", "history", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { json: true })));
    }
}
