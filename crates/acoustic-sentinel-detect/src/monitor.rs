//! Cooperative control loop.
//!
//! [`Monitor`] ties a [`SampleSource`] to a [`SentinelPipeline`] and an
//! [`AlarmIndicator`]. Each [`tick`](Monitor::tick) performs one bounded
//! source read, processes a block when one completes, and services the alarm
//! pulse. A started pulse always runs to its deadline. The loop never sleeps;
//! the source read timeout is its only wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use acoustic_sentinel_core::{
    AlarmIndicator, AlarmState, PredictiveModel, SampleRead, SampleSource, SpectralAnalyzer,
};
use acoustic_sentinel_signal::FftSpectralAnalyzer;
use tracing::{debug, info};

use crate::pipeline::SentinelPipeline;
use crate::pulse::AlarmPulse;
use crate::report::BlockReport;

/// Outcome of one [`Monitor::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// A sample was accepted without completing a block.
    Sample,
    /// Nothing valid was read.
    Miss,
    /// A block completed.
    Block(BlockReport),
    /// The source is exhausted.
    EndOfStream,
}

/// Loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Frames read from the source.
    pub frames: u64,
    /// Reads that returned nothing.
    pub misses: u64,
    /// Blocks processed, learning included.
    pub blocks: u64,
    /// Classified blocks that ended in `Alarm`.
    pub alarm_blocks: u64,
    /// Indicator pulses started.
    pub pulses: u64,
}

/// Owns the source, the pipeline and the alarm indicator.
#[derive(Debug)]
pub struct Monitor<S, M, I, A = FftSpectralAnalyzer> {
    source: S,
    pipeline: SentinelPipeline<M, A>,
    pulse: AlarmPulse<I>,
    stats: MonitorStats,
}

impl<S, M, I, A> Monitor<S, M, I, A>
where
    S: SampleSource,
    M: PredictiveModel,
    I: AlarmIndicator,
    A: SpectralAnalyzer,
{
    /// Monitor using the pipeline's configured pulse length.
    pub fn new(source: S, pipeline: SentinelPipeline<M, A>, indicator: I) -> Self {
        let pulse = AlarmPulse::new(indicator, pipeline.config().pulse_duration());
        Self {
            source,
            pipeline,
            pulse,
            stats: MonitorStats::default(),
        }
    }

    /// One read, optional block processing, pulse servicing.
    pub fn tick(&mut self, now: Instant) -> Tick {
        self.stats.ticks += 1;

        let tick = match self.source.read() {
            SampleRead::EndOfStream => Tick::EndOfStream,
            SampleRead::Miss => {
                self.stats.misses += 1;
                self.pipeline.push_frame(None, now);
                Tick::Miss
            }
            SampleRead::Frame(frame) => {
                self.stats.frames += 1;
                match self.pipeline.push_frame(Some(&frame), now) {
                    Some(report) => {
                        self.on_block(&report, now);
                        Tick::Block(report)
                    }
                    None => Tick::Sample,
                }
            }
        };

        self.pulse.service(now);
        tick
    }

    fn on_block(&mut self, report: &BlockReport, now: Instant) {
        self.stats.blocks += 1;
        let Some(inference) = report.as_inference() else {
            debug!(block = report.block(), "calibration block");
            return;
        };

        info!(block = inference.block, "{inference}");
        if inference.state == AlarmState::Alarm {
            self.stats.alarm_blocks += 1;
            self.pulse.fire(now);
            self.stats.pulses = self.pulse.pulses();
        }
    }

    /// Tick until `stop` is set, the source ends, or `max_blocks` blocks
    /// have been processed. The indicator is left off.
    pub fn run(&mut self, stop: &AtomicBool, max_blocks: Option<u64>) -> MonitorStats {
        while !stop.load(Ordering::Relaxed) {
            if self.tick(Instant::now()) == Tick::EndOfStream {
                info!("sample source exhausted");
                break;
            }
            if max_blocks.is_some_and(|max| self.stats.blocks >= max) {
                info!(blocks = self.stats.blocks, "block limit reached");
                break;
            }
        }
        self.pulse.release();
        self.stats
    }

    /// Loop counters.
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// The detection pipeline.
    pub fn pipeline(&self) -> &SentinelPipeline<M, A> {
        &self.pipeline
    }

    /// Whether the indicator is currently on.
    pub fn indicator_active(&self) -> bool {
        self.pulse.is_active()
    }

    /// The alarm indicator.
    pub fn indicator(&self) -> &I {
        self.pulse.indicator()
    }

    /// Source, pipeline and indicator.
    pub fn into_parts(self) -> (S, SentinelPipeline<M, A>, I) {
        (self.source, self.pipeline, self.pulse.into_inner())
    }
}
