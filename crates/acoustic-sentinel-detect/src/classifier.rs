//! Baseline normalization and per-block classification.

use acoustic_sentinel_core::config::{DEFAULT_LOW_GAIN, DEFAULT_SAFETY_THRESHOLD};
use acoustic_sentinel_core::{
    DetectionLabel, FeatureVector, PredictiveModel, RawBandEnergy, SentinelConfig,
};

use crate::calibrator::Baseline;

/// Outcome of classifying one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Normalized features handed to the model.
    pub features: FeatureVector,
    /// What the model predicted.
    pub model_label: DetectionLabel,
    /// Final label after the safety override.
    pub label: DetectionLabel,
    /// Whether the low-band override forced `Anomaly`.
    pub override_fired: bool,
}

/// Normalizes raw energies against the baseline and applies the model plus a
/// hard low-band safety override.
#[derive(Debug, Clone)]
pub struct Classifier<M> {
    model: M,
    low_gain: f32,
    safety_threshold: f32,
}

impl<M: PredictiveModel> Classifier<M> {
    /// Classifier with explicit gain and override threshold.
    pub fn new(model: M, low_gain: f32, safety_threshold: f32) -> Self {
        Self {
            model,
            low_gain,
            safety_threshold,
        }
    }

    /// Classifier using `low_gain` and `safety_threshold` from `config`.
    pub fn from_config(model: M, config: &SentinelConfig) -> Self {
        Self::new(model, config.low_gain, config.safety_threshold)
    }

    /// Baseline-relative feature vector.
    ///
    /// Energy below the baseline clamps to zero; the low band is amplified by
    /// the low gain.
    #[must_use]
    pub fn normalize(&self, raw: &RawBandEnergy, baseline: &Baseline) -> FeatureVector {
        FeatureVector {
            low: (raw.low - baseline.low).max(0.0) * self.low_gain,
            high: (raw.high - baseline.high).max(0.0),
            dominant_hz: raw.dominant_hz,
        }
    }

    /// Classify one block.
    pub fn classify(&self, raw: &RawBandEnergy, baseline: &Baseline) -> Classification {
        let features = self.normalize(raw, baseline);
        let model_label = self.model.predict(&features);
        let override_fired = features.low > self.safety_threshold;
        let label = if override_fired {
            DetectionLabel::Anomaly
        } else {
            model_label
        };
        Classification {
            features,
            model_label,
            label,
            override_fired,
        }
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Low-band gain.
    #[must_use]
    pub fn low_gain(&self) -> f32 {
        self.low_gain
    }

    /// Override threshold on `feat_low`.
    #[must_use]
    pub fn safety_threshold(&self) -> f32 {
        self.safety_threshold
    }
}

impl<M: PredictiveModel + Default> Default for Classifier<M> {
    fn default() -> Self {
        Self::new(M::default(), DEFAULT_LOW_GAIN, DEFAULT_SAFETY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stub::{ConstantModel, ScriptedModel};
    use approx::assert_abs_diff_eq;

    fn raw(low: f32, high: f32, dominant_hz: f32) -> RawBandEnergy {
        RawBandEnergy {
            low,
            high,
            dominant_hz,
        }
    }

    const BASE: Baseline = Baseline { low: 2.0, high: 3.0 };

    #[test]
    fn normalization_applies_gain_and_clamp() {
        let c: Classifier<ConstantModel> = Classifier::default();
        let f = c.normalize(&raw(2.05, 2.0, 440.0), &BASE);
        assert_abs_diff_eq!(f.low, 0.35, epsilon = 1e-5);
        assert_eq!(f.high, 0.0);
        assert_eq!(f.dominant_hz, 440.0);
    }

    #[test]
    fn override_forces_anomaly() {
        let c = Classifier::new(ConstantModel::normal(), 7.0, 0.6);
        let out = c.classify(&raw(2.1, 3.0, 120.0), &BASE);
        assert!(out.features.low > 0.6);
        assert!(out.override_fired);
        assert_eq!(out.model_label, DetectionLabel::Normal);
        assert_eq!(out.label, DetectionLabel::Anomaly);
    }

    #[test]
    fn override_threshold_is_strict() {
        let c = Classifier::new(ConstantModel::normal(), 1.0, 0.5);
        let out = c.classify(&raw(2.5, 3.0, 0.0), &BASE);
        assert_eq!(out.features.low, 0.5);
        assert!(!out.override_fired);
        assert_eq!(out.label, DetectionLabel::Normal);
    }

    #[test]
    fn model_label_passes_through_below_threshold() {
        let c = Classifier::new(ScriptedModel::from_bits(&[1]), 7.0, 0.6);
        let out = c.classify(&raw(2.0, 3.0, 0.0), &BASE);
        assert!(!out.override_fired);
        assert_eq!(out.label, DetectionLabel::Anomaly);
        assert_eq!(c.model().calls(), 1);
    }
}
