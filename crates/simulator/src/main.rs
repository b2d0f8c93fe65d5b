use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use launchpad_simulator::config::LoggingConfig;
use launchpad_simulator::{write_example, ScenarioRunner, SimulatorConfig};

#[derive(Parser, Debug)]
#[command(name = "launchpad-sim")]
#[command(about = "Replay bonding-curve launch scenarios against an in-memory registry")]
struct Cli {
    /// Scenario file path
    #[arg(short, long, default_value = "scenario.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the scenario and exit
    #[arg(long)]
    dry_run: bool,

    /// Write the event log as JSON to this path
    #[arg(long)]
    events_json: Option<PathBuf>,

    /// Write an example scenario to the config path and exit
    #[arg(long)]
    write_example: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.write_example {
        write_example(&cli.config)
            .with_context(|| format!("Failed to write example to {}", cli.config.display()))?;
        println!("Wrote example scenario to {}", cli.config.display());
        return Ok(());
    }

    let mut config = SimulatorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load scenario {}", cli.config.display()))?;

    // Override log level if provided
    if let Some(log_level) = cli.log_level {
        config.logging.level = log_level;
    }

    init_logging(&config.logging);

    info!("Loaded scenario {}", cli.config.display());
    info!(
        "{} accounts, {} steps, owner {}",
        config.accounts.len(),
        config.steps.len(),
        config.protocol.owner
    );

    if cli.dry_run {
        info!("Dry run mode - scenario is valid, exiting");
        return Ok(());
    }

    let report = ScenarioRunner::new(config)?.run()?;
    if report.failures() > 0 {
        warn!("{} of {} steps failed", report.failures(), report.steps.len());
    }
    println!("{}", report);

    if let Some(path) = cli.events_json {
        report
            .write_events_json(&path)
            .with_context(|| format!("Failed to write events to {}", path.display()))?;
        info!("Wrote {} events to {}", report.events.len(), path.display());
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse().unwrap_or(tracing::Level::INFO);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("launchpad_core={},launchpad_simulator={}", log_level, log_level).into()
    });

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
