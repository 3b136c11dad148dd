//! `simulate` subcommand: synthetic audio with a scheduled fault.

use std::sync::atomic::AtomicBool;

use anyhow::Result;
use clap::Args;
use tracing::info;

use acoustic_sentinel_core::SentinelConfig;
use acoustic_sentinel_detect::MonitorStats;
use acoustic_sentinel_hardware::{FaultBurst, SyntheticSource};

use crate::run::{self, CommonArgs};

/// Synthetic signal and fault burst schedule.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Generator seed
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Blocks to generate after calibration
    #[arg(long, default_value_t = 40)]
    pub blocks_after_calibration: u64,

    /// First faulty block, counted from the end of calibration
    #[arg(long, default_value_t = 20)]
    pub fault_offset: u64,

    /// Length of the fault in blocks (0 disables it)
    #[arg(long, default_value_t = 3)]
    pub fault_blocks: u64,

    /// Fault tone frequency in Hz
    #[arg(long, default_value_t = 250.0)]
    pub fault_freq: f32,

    /// Fault tone amplitude before input gain
    #[arg(long, default_value_t = 0.01)]
    pub fault_amplitude: f32,

    /// Probability that a read reports a miss
    #[arg(long, default_value_t = 0.0)]
    pub miss_probability: f64,
}

impl Default for ScheduleArgs {
    fn default() -> Self {
        Self {
            seed: 42,
            blocks_after_calibration: 40,
            fault_offset: 20,
            fault_blocks: 3,
            fault_freq: 250.0,
            fault_amplitude: 0.01,
            miss_probability: 0.0,
        }
    }
}

impl ScheduleArgs {
    /// Total blocks the generator produces.
    #[must_use]
    pub fn total_blocks(&self, config: &SentinelConfig) -> u64 {
        config.calibration_frames as u64 + self.blocks_after_calibration
    }

    /// Build the synthetic source for `config`.
    #[must_use]
    pub fn source(&self, config: &SentinelConfig) -> SyntheticSource {
        let block = config.block_size;
        let mut source = SyntheticSource::new(self.seed, config.sample_rate_hz)
            .with_miss_probability(self.miss_probability)
            .with_limit(self.total_blocks(config) * block as u64);
        if self.fault_blocks > 0 {
            let first = config.calibration_frames as u64 + self.fault_offset;
            info!(
                first_block = first,
                blocks = self.fault_blocks,
                freq_hz = self.fault_freq,
                "scheduling fault burst"
            );
            source = source.with_burst(FaultBurst::blocks(
                first,
                self.fault_blocks,
                block,
                self.fault_freq,
                self.fault_amplitude,
            ));
        }
        source
    }
}

/// Arguments for the simulate command
#[derive(Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns configuration, model or indicator setup failures.
pub fn execute(args: &SimulateArgs, stop: &AtomicBool) -> Result<MonitorStats> {
    let config = run::resolve_config(&args.common)?;
    let source = args.schedule.source(&config);
    run::monitor(Box::new(source), config, &args.common, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acoustic_sentinel_core::{SampleRead, SampleSource};

    fn small_config() -> SentinelConfig {
        SentinelConfig {
            block_size: 64,
            low_band: acoustic_sentinel_core::BandRange::new(1, 8),
            high_band: acoustic_sentinel_core::BandRange::new(8, 32),
            calibration_frames: 2,
            ..SentinelConfig::default()
        }
    }

    #[test]
    fn source_ends_after_scheduled_blocks() {
        let config = small_config();
        let schedule = ScheduleArgs {
            blocks_after_calibration: 3,
            ..ScheduleArgs::default()
        };
        let mut source = schedule.source(&config);
        let mut frames = 0;
        while let SampleRead::Frame(_) = source.read() {
            frames += 1;
        }
        assert_eq!(frames, 5 * 64);
    }

    #[test]
    fn zero_length_fault_is_quiet() {
        let config = small_config();
        let schedule = ScheduleArgs {
            fault_offset: 0,
            fault_blocks: 0,
            ..ScheduleArgs::default()
        };
        let mut source = schedule.source(&config);
        for _ in 0..(4 * 64) {
            if let SampleRead::Frame(frame) = source.read() {
                assert!(frame.samples[0].abs() < 0.003);
            }
        }
    }
}
