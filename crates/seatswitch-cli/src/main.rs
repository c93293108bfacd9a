//! CLI entry point - the composition root.
//!
//! This is the only place where the strategy and orchestrator are wired
//! together from configuration. Exit codes: 0 for Success/Degraded switches,
//! nonzero for Failed, Busy, unknown applications and configuration errors.

mod error;
mod parser;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use error::CliError;
use parser::{Cli, Commands};
use seatswitch_core::{SeatState, SwitchOutcome, SwitcherConfig, default_config_path};
use seatswitch_runtime::{Orchestrator, Systemctl, strategy_for};

#[tokio::main]
async fn main() {
    // Load environment variables before the parser reads SEATSWITCH_CONFIG.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("seatswitch: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = SwitcherConfig::load(&config_path)?;
    tracing::debug!(
        path = %config_path.display(),
        applications = config.applications.len(),
        strategy = ?config.strategy,
        "configuration loaded"
    );
    let strategy = strategy_for(config.strategy, Systemctl::new());
    let orchestrator = Orchestrator::new(config.applications.clone(), strategy);

    match cli.command {
        Commands::Switch { app } => {
            let target = app.or_else(|| config.default_app.clone()).ok_or_else(|| {
                CliError::Arguments(
                    "no application given and no default_app configured".to_string(),
                )
            })?;
            let result = orchestrator.switch(&target).await?;
            match &result.outcome {
                SwitchOutcome::Success => {
                    println!("{target} now owns the seat ({} ms)", result.elapsed_ms);
                }
                SwitchOutcome::Degraded => {
                    println!(
                        "{target} now owns the seat ({} ms); processes resisting termination: {:?}",
                        result.elapsed_ms, result.survivors
                    );
                }
                SwitchOutcome::Failed { reason } => {
                    eprintln!("switch to {target} failed: {reason}");
                }
            }
            Ok(i32::from(!result.is_running()))
        }
        Commands::Status { json } => {
            let status = orchestrator.status().await;
            let observed = orchestrator.observe_running().await;
            if json {
                let payload = serde_json::json!({
                    "seat": status,
                    "observed_running": observed,
                });
                println!("{payload:#}");
            } else {
                match &status.state {
                    SeatState::Running(app) => println!(
                        "seat: {app} (since {})",
                        status.since.format("%Y-%m-%d %H:%M:%S")
                    ),
                    SeatState::Idle => println!("seat: idle"),
                    other => println!("seat: {other:?}"),
                }
                if observed.is_empty() {
                    println!("observed running: none");
                } else {
                    println!("observed running: {}", observed.join(", "));
                }
            }
            Ok(0)
        }
        Commands::List => {
            for app in &config.applications {
                let default_marker = if config.default_app.as_deref() == Some(app.id.as_str()) {
                    " (default)"
                } else {
                    ""
                };
                println!("{:<20} {}{default_marker}", app.id, app.display_name());
            }
            Ok(0)
        }
        Commands::Stop { app } => {
            let record = orchestrator.stop(&app).await?;
            if record.survivors.is_empty() {
                println!("{app} stopped");
            } else {
                println!("{app} stopped; survivors: {:?}", record.survivors);
            }
            Ok(0)
        }
        Commands::Start { app } => {
            orchestrator.start(&app).await?;
            println!("{app} started");
            Ok(0)
        }
    }
}
