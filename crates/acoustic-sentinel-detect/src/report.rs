//! Per-block diagnostic records.

use std::fmt;

use acoustic_sentinel_core::{AlarmState, DetectionLabel, RawBandEnergy};

use crate::calibrator::{Baseline, CalibrationEvent};
use crate::classifier::Classification;

/// Diagnostics for one block processed after calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceReport {
    /// 1-based index of the processed block.
    pub block: u64,
    /// Raw band energies.
    pub raw: RawBandEnergy,
    /// Frozen baselines the block was normalized against.
    pub baseline: Baseline,
    /// Normalized features and labels.
    pub classification: Classification,
    /// Anomalies in the hysteresis window after this block.
    pub fault_count: usize,
    /// Hysteresis window size.
    pub window_size: usize,
    /// Resulting alarm state.
    pub state: AlarmState,
}

impl InferenceReport {
    /// Final label of the block.
    #[must_use]
    pub fn label(&self) -> DetectionLabel {
        self.classification.label
    }
}

impl fmt::Display for InferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features = &self.classification.features;
        write!(
            f,
            "low={:.3} high={:.3} dom={:.0}Hz pred={}",
            features.low,
            features.high,
            features.dominant_hz,
            self.classification.label.as_count(),
        )?;
        if self.classification.override_fired {
            f.write_str(" (override)")?;
        }
        write!(
            f,
            " | window [{}/{}] -> {}",
            self.fault_count, self.window_size, self.state
        )
    }
}

/// What the pipeline did with a completed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockReport {
    /// The block fed the calibrator.
    Learning {
        /// 1-based index of the processed block.
        block: u64,
        /// Raw band energies.
        raw: RawBandEnergy,
        /// Calibrator outcome.
        event: CalibrationEvent,
    },
    /// The block was classified.
    Inference(InferenceReport),
}

impl BlockReport {
    /// 1-based index of the processed block.
    #[must_use]
    pub fn block(&self) -> u64 {
        match self {
            Self::Learning { block, .. } => *block,
            Self::Inference(report) => report.block,
        }
    }

    /// Alarm state, once calibrated.
    #[must_use]
    pub fn state(&self) -> Option<AlarmState> {
        self.as_inference().map(|r| r.state)
    }

    /// Inference details, if this block was classified.
    #[must_use]
    pub fn as_inference(&self) -> Option<&InferenceReport> {
        match self {
            Self::Inference(report) => Some(report),
            Self::Learning { .. } => None,
        }
    }

    /// Whether this block completed calibration.
    #[must_use]
    pub fn completed_calibration(&self) -> bool {
        matches!(
            self,
            Self::Learning {
                event: CalibrationEvent::Completed(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acoustic_sentinel_core::FeatureVector;

    fn report(override_fired: bool) -> InferenceReport {
        InferenceReport {
            block: 101,
            raw: RawBandEnergy::default(),
            baseline: Baseline::default(),
            classification: Classification {
                features: FeatureVector {
                    low: 0.8123,
                    high: 0.05,
                    dominant_hz: 250.4,
                },
                model_label: DetectionLabel::Normal,
                label: DetectionLabel::Anomaly,
                override_fired,
            },
            fault_count: 1,
            window_size: 6,
            state: AlarmState::Observing,
        }
    }

    #[test]
    fn display_line() {
        assert_eq!(
            report(false).to_string(),
            "low=0.812 high=0.050 dom=250Hz pred=1 | window [1/6] -> OBSERVING"
        );
    }

    #[test]
    fn display_marks_override() {
        assert!(report(true).to_string().contains("pred=1 (override) |"));
    }

    #[test]
    fn accessors() {
        let inference = BlockReport::Inference(report(false));
        assert_eq!(inference.block(), 101);
        assert_eq!(inference.state(), Some(AlarmState::Observing));
        assert!(!inference.completed_calibration());

        let learning = BlockReport::Learning {
            block: 100,
            raw: RawBandEnergy::default(),
            event: CalibrationEvent::Completed(Baseline::default()),
        };
        assert_eq!(learning.state(), None);
        assert!(learning.completed_calibration());
    }
}
