// Flight recorder command line
//
// Offline helpers around the flight recorder: aggregate a capture file into
// a flame graph and check a configuration file before deploying it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use kodegen_flight_recorder::trigger::{ExpressionEvaluator, MeterExpressionEvaluator};
use kodegen_flight_recorder::{AllFrames, FlameGraph, FlightRecorderConfig, PackagePrefixFilter};

#[derive(Debug, Parser)]
#[command(name = "kodegen-flight-recorder", version, about = "Flight recorder tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate a JSON-lines capture file into flame-graph JSON
    Flame {
        capture: PathBuf,
        /// Only keep frames whose owning type starts with this prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load and validate a configuration file
    CheckConfig { config: PathBuf },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Flame {
            capture,
            prefix,
            out,
        } => flame(&capture, prefix, out),
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn flame(capture: &Path, prefix: Option<String>, out: Option<PathBuf>) -> Result<()> {
    let graph = match prefix {
        Some(prefix) => FlameGraph::from_file(capture, &PackagePrefixFilter::new(prefix)),
        None => FlameGraph::from_file(capture, &AllFrames),
    }
    .with_context(|| format!("Failed to aggregate {}", capture.display()))?;

    let json = serde_json::to_string_pretty(&graph)?;
    match out {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Flame graph written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = FlightRecorderConfig::load(path)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;

    let evaluator = MeterExpressionEvaluator::new();
    for trigger in &config.triggers {
        evaluator
            .validate(&trigger.expression)
            .with_context(|| format!("Invalid trigger in {}", path.display()))?;
    }

    let cleanup = config
        .recording_cleanup_type
        .map_or_else(|| "unset".to_string(), |t| t.to_string());
    println!("enabled:          {}", config.enabled);
    println!("cleanup policy:   {cleanup}");
    println!("cleanup interval: {:?}", config.recording_cleanup_interval());
    println!("base config:      {}", config.base_configuration());
    println!(
        "triggers:         {} ({})",
        config.triggers.len(),
        if config.trigger_enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}
