//! `run` subcommand: the detector against a chosen sample source.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use acoustic_sentinel_core::{AlarmIndicator, MicChannel, SampleSource, SentinelConfig};
use acoustic_sentinel_detect::{DecisionForest, Monitor, MonitorStats, SentinelPipeline};
use acoustic_sentinel_hardware::{ReplaySource, SysfsLedIndicator, UdpMicSource};

use crate::indicator::LogIndicator;
use crate::load_config;
use crate::simulate::ScheduleArgs;

/// Default UDP listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5005";

/// Where samples come from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Live packets from a microphone node
    Udp,
    /// Recorded packet file
    Replay,
    /// Seeded synthetic audio
    Simulate,
}

/// Options shared by every command that runs the detector.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Decision forest JSON (the embedded forest is used when omitted)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Microphone channel to analyze, overriding the configuration
    #[arg(long)]
    pub channel: Option<MicChannel>,

    /// Sysfs LED name to pulse on alarm (logs the alarm when omitted)
    #[arg(long)]
    pub led: Option<String>,

    /// Stop after this many processed blocks
    #[arg(long)]
    pub max_blocks: Option<u64>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Sample source
    #[arg(short, long, value_enum, default_value = "udp")]
    pub source: SourceKind,

    /// UDP listen address
    #[arg(short, long, default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Packet file for the replay source
    #[arg(short, long, required_if_eq("source", "replay"))]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns setup failures; the monitor loop itself does not fail.
pub fn execute(args: &RunArgs, stop: &AtomicBool) -> Result<MonitorStats> {
    let config = resolve_config(&args.common)?;
    let source: Box<dyn SampleSource> = match args.source {
        SourceKind::Udp => {
            let source = UdpMicSource::bind(&args.bind)?;
            info!(addr = %args.bind, "listening for microphone packets");
            Box::new(source)
        }
        SourceKind::Replay => {
            let path = args
                .file
                .as_deref()
                .context("--file is required for the replay source")?;
            info!(file = %path.display(), "replaying capture");
            Box::new(ReplaySource::open(path)?)
        }
        SourceKind::Simulate => Box::new(args.schedule.source(&config)),
    };
    monitor(source, config, &args.common, stop)
}

/// Load the configuration and apply command-line overrides.
pub(crate) fn resolve_config(common: &CommonArgs) -> Result<SentinelConfig> {
    let mut config = load_config(common.config.as_deref())?;
    if let Some(channel) = common.channel {
        config.channel = channel;
    }
    Ok(config)
}

/// Run the monitor loop over `source` until it ends, the block limit is
/// reached, or `stop` is set.
pub(crate) fn monitor(
    source: Box<dyn SampleSource>,
    config: SentinelConfig,
    common: &CommonArgs,
    stop: &AtomicBool,
) -> Result<MonitorStats> {
    let model = match &common.model {
        Some(path) => DecisionForest::from_json_file(path)
            .with_context(|| format!("failed to load model {}", path.display()))?,
        None => DecisionForest::embedded()?,
    };
    info!(
        model = %model.name,
        trees = model.len(),
        channel = %config.channel,
        block_size = config.block_size,
        calibration_frames = config.calibration_frames,
        "starting acoustic sentinel"
    );

    let indicator: Box<dyn AlarmIndicator> = match &common.led {
        Some(name) => Box::new(SysfsLedIndicator::open(name)?),
        None => Box::new(LogIndicator::new()),
    };

    let pipeline = SentinelPipeline::new(config, model)?;
    let mut monitor = Monitor::new(source, pipeline, indicator);
    let stats = monitor.run(stop, common.max_blocks);

    let pipeline_stats = monitor.pipeline().stats();
    info!(
        blocks = stats.blocks,
        alarm_blocks = stats.alarm_blocks,
        pulses = stats.pulses,
        misses = stats.misses,
        dropped = pipeline_stats.samples_dropped,
        stall_resets = pipeline_stats.stall_resets,
        "monitor stopped"
    );
    Ok(stats)
}
