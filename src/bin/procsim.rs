//! procsim — Run operating-system simulations from metadata workloads.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use procsim::{parse_metadata, Config, Journal, LogTarget, Simulator};

/// Run operating-system simulations from metadata workloads.
#[derive(Parser)]
#[command(name = "procsim")]
struct Cli {
    /// Path to the simulator configuration file.
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let journal = Journal::new();

    // Missing or malformed inputs are reported inside the log and the
    // run proceeds with whatever state exists.
    let cfg = match fs::read_to_string(&cli.config) {
        Ok(text) => match Config::parse(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %cli.config.display(), error = %e, "bad configuration");
                journal.note(format!("Configuration error: {e}"));
                Config::default()
            }
        },
        Err(_) => {
            journal.note("No configuration file found.");
            Config::default()
        }
    };

    let processes = match fs::read_to_string(&cfg.metadata_path) {
        Ok(text) => match parse_metadata(&text) {
            Ok(processes) => processes,
            Err(e) => {
                warn!(path = %cfg.metadata_path, error = %e, "bad metadata");
                journal.note(format!("Metadata error: {e}"));
                Vec::new()
            }
        },
        Err(_) => {
            journal.note("No metadata file found.");
            Vec::new()
        }
    };

    let mut sim = Simulator::new(cfg.clone(), processes, journal);
    sim.run();

    // Without a log path (no configuration file) the terminal is the only
    // destination left.
    let target = if cfg.log_path.is_empty() {
        LogTarget::Monitor
    } else {
        cfg.log_to
    };
    sim.journal()
        .deliver(target, &cfg.log_path)
        .context("failed to deliver simulation log")?;

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
