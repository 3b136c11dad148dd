//! Domain types shared across the acoustic-sentinel crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Binary per-block decision produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionLabel {
    /// Block looks like ambient background.
    #[default]
    Normal,
    /// Block looks like a fault event.
    Anomaly,
}

impl DetectionLabel {
    /// Numeric form used by the moving sum (`0` or `1`).
    #[must_use]
    pub fn as_count(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Anomaly => 1,
        }
    }

    /// Whether this label marks an anomaly.
    #[must_use]
    pub fn is_anomaly(self) -> bool {
        self == Self::Anomaly
    }
}

impl From<bool> for DetectionLabel {
    fn from(anomaly: bool) -> Self {
        if anomaly {
            Self::Anomaly
        } else {
            Self::Normal
        }
    }
}

/// Three-level alarm signal derived from the recent decision history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    /// No anomalies in the window.
    #[default]
    Normal,
    /// Some anomalies, fewer than the alarm threshold.
    Observing,
    /// At least `threshold` anomalies in the window.
    Alarm,
}

impl AlarmState {
    /// Derive the alarm state from a fault count.
    ///
    /// The threshold is inclusive: `fault_count == threshold` is an alarm.
    #[must_use]
    pub fn from_fault_count(fault_count: usize, threshold: usize) -> Self {
        if fault_count >= threshold {
            Self::Alarm
        } else if fault_count > 0 {
            Self::Observing
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("NORMAL"),
            Self::Observing => f.write_str("OBSERVING"),
            Self::Alarm => f.write_str("ALARM"),
        }
    }
}

/// Per-block band energies before baseline normalization.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBandEnergy {
    /// `ln(1 + sum)` over the low band.
    pub low: f32,
    /// `ln(1 + sum)` over the high band.
    pub high: f32,
    /// Dominant frequency of the block in Hz.
    pub dominant_hz: f32,
}

/// Baseline-normalized feature vector fed to the predictive model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Low-band energy above baseline, amplified by the low-band gain.
    pub low: f32,
    /// High-band energy above baseline.
    pub high: f32,
    /// Dominant frequency in Hz.
    pub dominant_hz: f32,
}

impl FeatureVector {
    /// Number of features.
    pub const LEN: usize = 3;

    /// Features in model input order.
    #[must_use]
    pub fn to_array(&self) -> [f32; Self::LEN] {
        [self.low, self.high, self.dominant_hz]
    }
}

/// One of the four microphones on the two satellite boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MicChannel {
    /// Left board, top microphone.
    #[default]
    LeftTop,
    /// Left board, bottom microphone.
    LeftBottom,
    /// Right board, top microphone.
    RightTop,
    /// Right board, bottom microphone.
    RightBottom,
}

impl MicChannel {
    /// All channels in wire order.
    pub const ALL: [Self; 4] = [
        Self::LeftTop,
        Self::LeftBottom,
        Self::RightTop,
        Self::RightBottom,
    ];

    /// Position of this channel inside a [`MicFrame`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::LeftTop => 0,
            Self::LeftBottom => 1,
            Self::RightTop => 2,
            Self::RightBottom => 3,
        }
    }

    /// Kebab-case name, as used in config files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftTop => "left-top",
            Self::LeftBottom => "left-bottom",
            Self::RightTop => "right-top",
            Self::RightBottom => "right-bottom",
        }
    }
}

impl fmt::Display for MicChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MicChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ch| ch.as_str() == s)
            .ok_or_else(|| {
                format!("unknown channel '{s}' (expected left-top, left-bottom, right-top or right-bottom)")
            })
    }
}

/// One simultaneous sample from every microphone, scaled to float.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MicFrame {
    /// Samples in [`MicChannel`] order.
    pub samples: [f32; 4],
}

impl MicFrame {
    /// Create a frame from the four channel samples.
    #[must_use]
    pub fn new(samples: [f32; 4]) -> Self {
        Self { samples }
    }

    /// Sample of a single channel.
    #[must_use]
    pub fn channel(&self, channel: MicChannel) -> f32 {
        self.samples[channel.index()]
    }

    /// Whether every channel carries a finite value.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }
}
