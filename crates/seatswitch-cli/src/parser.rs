//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line interface for the seat switcher.
#[derive(Parser)]
#[command(name = "seatswitch")]
#[command(about = "Hand the display seat between appliance applications")]
#[command(version)]
pub struct Cli {
    /// Override the configuration file for this invocation
    #[arg(long, global = true, env = "SEATSWITCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Switch the seat to an application (the configured default when omitted)
    Switch {
        /// Application id to switch to
        app: Option<String>,
    },
    /// Show which application currently owns the seat
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// List the configured applications
    List,
    /// Stop one application without starting another
    Stop {
        /// Application id to stop
        app: String,
    },
    /// Launch one application without stopping the others
    Start {
        /// Application id to start
        app: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn switch_app_is_optional() {
        let cli = Cli::parse_from(["seatswitch", "switch"]);
        assert!(matches!(cli.command, Commands::Switch { app: None }));

        let cli = Cli::parse_from(["seatswitch", "--verbose", "switch", "kodi"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Switch { app: Some(app) } if app == "kodi"));
    }

    #[test]
    fn config_is_global() {
        let cli = Cli::parse_from(["seatswitch", "status", "--json", "--config", "/tmp/apps.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/apps.json")));
        assert!(matches!(cli.command, Commands::Status { json: true }));
    }
}
