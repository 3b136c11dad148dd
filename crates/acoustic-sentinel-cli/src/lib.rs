//! acoustic-sentinel CLI
//!
//! Command-line front end for the acoustic anomaly detector.
//!
//! # Commands
//!
//! - **run**: monitor a live UDP microphone stream, a recorded packet file or
//!   the synthetic generator
//! - **simulate**: synthetic background with a scheduled fault burst
//! - **config**: print or write the default configuration
//! - **version**: display version information
//!
//! # Usage
//!
//! ```bash
//! # Listen for microphone packets and drive an LED on alarm
//! acoustic-sentinel run --source udp --bind 0.0.0.0:5005 --led sentinel:red
//!
//! # Replay a capture with a custom configuration
//! acoustic-sentinel run --source replay --file capture.bin --config sentinel.json
//!
//! # Watch the detector calibrate and catch an injected fault
//! acoustic-sentinel simulate --fault-offset 10 --fault-blocks 4
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use acoustic_sentinel_core::SentinelConfig;

pub mod indicator;
pub mod run;
pub mod simulate;

pub use indicator::LogIndicator;

/// Acoustic anomaly detector
#[derive(Parser, Debug)]
#[command(name = "acoustic-sentinel")]
#[command(author, version, about = "Acoustic anomaly detection for machinery monitoring")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detector against a sample source
    Run(run::RunArgs),

    /// Run the detector on synthetic audio with an injected fault
    Simulate(simulate::SimulateArgs),

    /// Print the default configuration as JSON
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Execute a parsed command. `stop` ends a running monitor when set.
///
/// # Errors
///
/// Returns any configuration, model, source or indicator setup failure.
pub fn execute(command: Commands, stop: &AtomicBool) -> Result<()> {
    match command {
        Commands::Run(args) => run::execute(&args, stop).map(drop),
        Commands::Simulate(args) => simulate::execute(&args, stop).map(drop),
        Commands::Config { output } => write_default_config(output.as_deref()),
        Commands::Version => {
            println!("acoustic-sentinel {}", env!("CARGO_PKG_VERSION"));
            println!("detect module version: {}", acoustic_sentinel_detect::VERSION);
            Ok(())
        }
    }
}

/// Load a configuration file, or the defaults when `path` is `None`.
///
/// # Errors
///
/// Returns the I/O, JSON or validation error for the file.
pub fn load_config(path: Option<&Path>) -> Result<SentinelConfig> {
    let config = match path {
        Some(path) => SentinelConfig::from_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SentinelConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn write_default_config(output: Option<&Path>) -> Result<()> {
    let config = SentinelConfig::default();
    match output {
        Some(path) => {
            config
                .to_json(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
        None => println!("{}", config.to_json_string()?),
    }
    Ok(())
}
