//! Sample-to-alarm-state processing pipeline.
//!
//! `SentinelPipeline` owns every stage and all mutable detection state:
//!
//! 1. Block accumulation with stall reset
//! 2. DC removal
//! 3. Windowed FFT and dominant frequency
//! 4. Band-energy extraction
//! 5. Calibration (first K blocks) or classification + hysteresis
//!
//! It never touches I/O; [`Monitor`](crate::Monitor) connects it to a source
//! and an indicator.

use std::time::Instant;

use acoustic_sentinel_core::{
    MicFrame, PredictiveModel, RawBandEnergy, SentinelConfig, SentinelError, SignalError,
    SpectralAnalyzer,
};
use acoustic_sentinel_signal::{remove_dc, BlockAccumulator, FeatureExtractor, FftSpectralAnalyzer};
use tracing::{debug, info, warn};

use crate::calibrator::{CalibrationEvent, Calibrator};
use crate::classifier::Classifier;
use crate::hysteresis::HysteresisFilter;
use crate::report::{BlockReport, InferenceReport};

/// Counters maintained by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Finite samples appended to a block.
    pub samples_accepted: u64,
    /// Misses and non-finite samples.
    pub samples_dropped: u64,
    /// Completed blocks run through the chain.
    pub blocks_processed: u64,
    /// Partial blocks discarded after an acquisition stall.
    pub stall_resets: u64,
}

/// The complete detection pipeline.
#[derive(Debug)]
pub struct SentinelPipeline<M, A = FftSpectralAnalyzer> {
    config: SentinelConfig,
    accumulator: BlockAccumulator,
    analyzer: A,
    extractor: FeatureExtractor,
    calibrator: Calibrator,
    classifier: Classifier<M>,
    hysteresis: HysteresisFilter,
    stats: PipelineStats,
}

impl<M: PredictiveModel> SentinelPipeline<M> {
    /// Pipeline with the Hamming-windowed FFT analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: SentinelConfig, model: M) -> Result<Self, SentinelError> {
        config.validate()?;
        let analyzer = FftSpectralAnalyzer::new(config.block_size, config.sample_rate_hz as f32)?;
        Self::with_analyzer(config, model, analyzer)
    }
}

impl<M: PredictiveModel, A: SpectralAnalyzer> SentinelPipeline<M, A> {
    /// Pipeline with a caller-supplied spectral analyzer.
    ///
    /// The analyzer must accept blocks of `config.block_size` samples.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_analyzer(
        config: SentinelConfig,
        model: M,
        analyzer: A,
    ) -> Result<Self, SentinelError> {
        config.validate()?;
        let extractor = FeatureExtractor::from_config(&config)?;
        Ok(Self {
            accumulator: BlockAccumulator::new(config.block_size),
            analyzer,
            extractor,
            calibrator: Calibrator::from_config(&config),
            classifier: Classifier::from_config(model, &config),
            hysteresis: HysteresisFilter::from_config(&config),
            stats: PipelineStats::default(),
            config,
        })
    }

    /// Feed the configured channel of a frame, or a miss when `None`.
    pub fn push_frame(&mut self, frame: Option<&MicFrame>, now: Instant) -> Option<BlockReport> {
        let sample = frame.map(|f| f.channel(self.config.channel));
        self.push_sample(sample, now)
    }

    /// Feed one raw sample received at `now`; `None`, or a value that is
    /// not finite after gain, counts as a miss and leaves the block untouched.
    ///
    /// The sample is scaled by the input gain before accumulation. Returns a
    /// report when the sample completes a block.
    pub fn push_sample(&mut self, sample: Option<f32>, now: Instant) -> Option<BlockReport> {
        if let Some(timeout) = self.config.stall_timeout() {
            if self.accumulator.expire_stale(now, timeout) {
                self.stats.stall_resets += 1;
            }
        }

        let scaled = sample
            .map(|s| s * self.config.input_gain)
            .filter(|s| s.is_finite());
        let Some(scaled) = scaled else {
            self.stats.samples_dropped += 1;
            return None;
        };
        self.stats.samples_accepted += 1;

        let raw = {
            let block = self.accumulator.push(scaled, now)?;
            analyze_block(&mut self.analyzer, &self.extractor, block)
        };

        match raw {
            Ok(raw) => Some(self.process_raw(raw)),
            Err(err) => {
                warn!(%err, "block analysis failed, block discarded");
                None
            }
        }
    }

    /// Run an already-scaled block through preconditioning, analysis and
    /// the calibrate/classify branch. The block is modified in place.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidBlockLength`] if `block` does not match
    /// the configured block size.
    pub fn process_block(&mut self, block: &mut [f32]) -> Result<BlockReport, SignalError> {
        let raw = analyze_block(&mut self.analyzer, &self.extractor, block)?;
        Ok(self.process_raw(raw))
    }

    fn process_raw(&mut self, raw: RawBandEnergy) -> BlockReport {
        self.stats.blocks_processed += 1;
        let block = self.stats.blocks_processed;

        let Some(baseline) = self.calibrator.baseline() else {
            let event = self.calibrator.observe(&raw);
            match event {
                CalibrationEvent::Progress { frames, target } => {
                    info!(frames, target, "learning background noise");
                }
                CalibrationEvent::Rejected { frames } => {
                    warn!(frames, "non-finite band energy, calibration block skipped");
                }
                CalibrationEvent::Completed(baseline) => {
                    if self.calibrator.at_progress_milestone() {
                        info!(
                            frames = self.calibrator.frames(),
                            target = self.calibrator.target_frames(),
                            "learning background noise"
                        );
                    }
                    info!(
                        baseline_low = baseline.low,
                        baseline_high = baseline.high,
                        "calibration complete, monitoring started"
                    );
                }
                CalibrationEvent::Accumulated { .. } | CalibrationEvent::Ignored => {}
            }
            return BlockReport::Learning { block, raw, event };
        };

        let classification = self.classifier.classify(&raw, &baseline);
        if classification.override_fired {
            debug!(
                feat_low = classification.features.low,
                "low-band energy above safety threshold, forcing anomaly"
            );
        }
        let state = self.hysteresis.update(classification.label);

        BlockReport::Inference(InferenceReport {
            block,
            raw,
            baseline,
            classification,
            fault_count: self.hysteresis.fault_count(),
            window_size: self.hysteresis.window_size(),
            state,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// Calibration state.
    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Classifier and its model.
    pub fn classifier(&self) -> &Classifier<M> {
        &self.classifier
    }

    /// Hysteresis state.
    pub fn hysteresis(&self) -> &HysteresisFilter {
        &self.hysteresis
    }

    /// Spectral analyzer.
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Samples collected toward the current block.
    pub fn fill_level(&self) -> usize {
        self.accumulator.fill_level()
    }

    /// Counters.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

fn analyze_block<A: SpectralAnalyzer>(
    analyzer: &mut A,
    extractor: &FeatureExtractor,
    block: &mut [f32],
) -> Result<RawBandEnergy, SignalError> {
    remove_dc(block);
    analyzer.compute(block)?;
    Ok(extractor.extract(analyzer.spectrum(), analyzer.dominant_frequency()))
}
