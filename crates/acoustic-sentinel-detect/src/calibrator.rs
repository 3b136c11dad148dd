//! Background noise calibration.
//!
//! The calibrator averages the raw band energies of the first K blocks to
//! learn what "quiet" sounds like in the installation. Once K blocks have
//! been observed the baselines are frozen for the lifetime of the instance.

use acoustic_sentinel_core::{RawBandEnergy, SentinelConfig};
use serde::{Deserialize, Serialize};

/// Calibration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationPhase {
    /// Accumulating background statistics.
    Learning,
    /// Baselines are frozen.
    Calibrated,
}

/// Mean background band energies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Baseline {
    /// Mean `raw_low` over the calibration blocks.
    pub low: f32,
    /// Mean `raw_high` over the calibration blocks.
    pub high: f32,
}

/// Result of feeding one block to the [`Calibrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEvent {
    /// Block accumulated, no milestone reached.
    Accumulated {
        /// Blocks observed so far.
        frames: usize,
    },
    /// Block accumulated and `frames` is a multiple of the progress interval.
    Progress {
        /// Blocks observed so far.
        frames: usize,
        /// Blocks required.
        target: usize,
    },
    /// The block's energies were not finite and were not counted.
    Rejected {
        /// Blocks counted so far.
        frames: usize,
    },
    /// The final calibration block was observed and baselines are frozen.
    Completed(Baseline),
    /// The calibrator was already calibrated; nothing changed.
    Ignored,
}

/// Two-state background estimator (`Learning -> Calibrated`).
#[derive(Debug, Clone)]
pub struct Calibrator {
    target_frames: usize,
    progress_interval: usize,
    frames: usize,
    sum_low: f64,
    sum_high: f64,
    baseline: Option<Baseline>,
}

impl Calibrator {
    /// Calibrator that freezes after `target_frames` blocks.
    ///
    /// Zero values are raised to one.
    #[must_use]
    pub fn new(target_frames: usize, progress_interval: usize) -> Self {
        Self {
            target_frames: target_frames.max(1),
            progress_interval: progress_interval.max(1),
            frames: 0,
            sum_low: 0.0,
            sum_high: 0.0,
            baseline: None,
        }
    }

    /// Calibrator using `calibration_frames` and `progress_interval` from `config`.
    #[must_use]
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self::new(config.calibration_frames, config.progress_interval)
    }

    /// Feed the raw energies of one block.
    pub fn observe(&mut self, raw: &RawBandEnergy) -> CalibrationEvent {
        if self.baseline.is_some() {
            return CalibrationEvent::Ignored;
        }
        if !(raw.low.is_finite() && raw.high.is_finite()) {
            return CalibrationEvent::Rejected {
                frames: self.frames,
            };
        }

        self.sum_low += f64::from(raw.low);
        self.sum_high += f64::from(raw.high);
        self.frames += 1;

        if self.frames >= self.target_frames {
            let n = self.frames as f64;
            let baseline = Baseline {
                low: (self.sum_low / n) as f32,
                high: (self.sum_high / n) as f32,
            };
            self.baseline = Some(baseline);
            return CalibrationEvent::Completed(baseline);
        }

        if self.at_progress_milestone() {
            CalibrationEvent::Progress {
                frames: self.frames,
                target: self.target_frames,
            }
        } else {
            CalibrationEvent::Accumulated {
                frames: self.frames,
            }
        }
    }

    /// Whether the block count is a non-zero multiple of the progress
    /// interval. Also true on the completing block when the target is such
    /// a multiple, where [`CalibrationEvent::Completed`] is reported instead.
    #[must_use]
    pub fn at_progress_milestone(&self) -> bool {
        self.frames > 0 && self.frames % self.progress_interval == 0
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CalibrationPhase {
        if self.baseline.is_some() {
            CalibrationPhase::Calibrated
        } else {
            CalibrationPhase::Learning
        }
    }

    /// Whether the baselines are frozen.
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Frozen baselines, once calibrated.
    #[must_use]
    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    /// Blocks observed while learning.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Blocks required to calibrate.
    #[must_use]
    pub fn target_frames(&self) -> usize {
        self.target_frames
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::from_config(&SentinelConfig::default())
    }
}
