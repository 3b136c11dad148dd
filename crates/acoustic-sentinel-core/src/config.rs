//! Runtime configuration for the acoustic-sentinel pipeline.
//!
//! [`SentinelConfig`] collects every tuning constant of the detector. The
//! defaults are the values the detector was calibrated with on the reference
//! hardware (16 kHz, 1024-sample blocks); a JSON file may override any subset
//! of fields.
//!
//! # Example
//!
//! ```rust
//! use acoustic_sentinel_core::SentinelConfig;
//!
//! let cfg = SentinelConfig::default();
//! cfg.validate().expect("default config is valid");
//!
//! assert_eq!(cfg.block_size, 1024);
//! assert_eq!(cfg.calibration_frames, 100);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MicChannel;

/// Sampling rate of the microphones in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
/// Samples per analysis block (FFT size).
pub const DEFAULT_BLOCK_SIZE: usize = 1024;
/// Blocks averaged into the background baseline.
pub const DEFAULT_CALIBRATION_FRAMES: usize = 100;
/// Calibration progress is reported every this many blocks.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;
/// Decisions retained by the hysteresis window.
pub const DEFAULT_WINDOW_SIZE: usize = 6;
/// Anomalies in the window needed to raise the alarm.
pub const DEFAULT_ALARM_THRESHOLD: usize = 2;
/// Amplification applied to the low-band energy delta.
pub const DEFAULT_LOW_GAIN: f32 = 7.0;
/// Low-band feature level above which a block is always an anomaly.
pub const DEFAULT_SAFETY_THRESHOLD: f32 = 0.6;
/// Software gain compensating for signal loss in the analog front end.
pub const DEFAULT_INPUT_GAIN: f32 = 23.0;
/// Length of the alarm indicator pulse.
pub const DEFAULT_PULSE_MS: u64 = 20;
/// Idle time after which a partial block is discarded.
pub const DEFAULT_STALL_TIMEOUT_MS: u64 = 1000;

/// Half-open range of spectrum bins `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRange {
    /// First bin (inclusive).
    pub start: usize,
    /// Last bin (exclusive).
    pub end: usize,
}

impl BandRange {
    /// Create a band covering bins `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bins in the band.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the band covers no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lower edge of the band in Hz for a given bin width.
    #[must_use]
    pub fn start_hz(&self, bin_width_hz: f32) -> f32 {
        self.start as f32 * bin_width_hz
    }

    /// Upper edge of the band in Hz for a given bin width.
    #[must_use]
    pub fn end_hz(&self, bin_width_hz: f32) -> f32 {
        self.end as f32 * bin_width_hz
    }
}

/// Complete detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    // -----------------------------------------------------------------------
    // Acquisition
    // -----------------------------------------------------------------------
    /// Sampling rate in Hz. Default: **16000**.
    pub sample_rate_hz: u32,

    /// Microphone feeding the pipeline. Default: **left-top**.
    pub channel: MicChannel,

    /// Gain applied to every sample before accumulation. Default: **23.0**.
    pub input_gain: f32,

    /// Partial blocks idle for longer than this are discarded; `0` disables
    /// the stall reset. Default: **1000 ms**.
    pub stall_timeout_ms: u64,

    // -----------------------------------------------------------------------
    // Spectral features
    // -----------------------------------------------------------------------
    /// Block size N; must be a power of two. Default: **1024**.
    pub block_size: usize,

    /// Low band bins. Default: **[1, 64)** (DC excluded).
    pub low_band: BandRange,

    /// High band bins. Default: **[128, 512)**.
    pub high_band: BandRange,

    // -----------------------------------------------------------------------
    // Calibration / classification
    // -----------------------------------------------------------------------
    /// Background blocks averaged into the baseline (K). Default: **100**.
    pub calibration_frames: usize,

    /// Calibration progress reporting interval. Default: **10**.
    pub progress_interval: usize,

    /// Multiplier on the low-band delta. Default: **7.0**.
    pub low_gain: f32,

    /// Low-band feature level that forces an anomaly. Default: **0.6**.
    pub safety_threshold: f32,

    // -----------------------------------------------------------------------
    // Hysteresis / output
    // -----------------------------------------------------------------------
    /// Hysteresis window length W. Default: **6**.
    pub window_size: usize,

    /// Anomaly count T that raises the alarm. Default: **2**.
    pub alarm_threshold: usize,

    /// Alarm indicator pulse length. Default: **20 ms**.
    pub pulse_ms: u64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            channel: MicChannel::LeftTop,
            input_gain: DEFAULT_INPUT_GAIN,
            stall_timeout_ms: DEFAULT_STALL_TIMEOUT_MS,
            block_size: DEFAULT_BLOCK_SIZE,
            low_band: BandRange::new(1, 64),
            high_band: BandRange::new(128, 512),
            calibration_frames: DEFAULT_CALIBRATION_FRAMES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            low_gain: DEFAULT_LOW_GAIN,
            safety_threshold: DEFAULT_SAFETY_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            alarm_threshold: DEFAULT_ALARM_THRESHOLD,
            pulse_ms: DEFAULT_PULSE_MS,
        }
    }
}

impl SentinelConfig {
    /// Load a configuration from a JSON file and validate it.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be opened and
    /// [`ConfigError::InvalidValue`] if the JSON is malformed or a field
    /// violates its invariant.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: SentinelConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::invalid_value("(file)", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty-printed JSON form of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))
    }

    /// Width of one spectrum bin in Hz.
    #[must_use]
    pub fn bin_width_hz(&self) -> f32 {
        self.sample_rate_hz as f32 / self.block_size as f32
    }

    /// Number of usable spectrum bins (`N / 2`).
    #[must_use]
    pub fn spectrum_bins(&self) -> usize {
        self.block_size / 2
    }

    /// Alarm pulse length.
    #[must_use]
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    /// Stall timeout, or `None` when the stall reset is disabled.
    #[must_use]
    pub fn stall_timeout(&self) -> Option<Duration> {
        (self.stall_timeout_ms > 0).then(|| Duration::from_millis(self.stall_timeout_ms))
    }

    /// Validate all fields and return the first violated invariant.
    ///
    /// # Validated invariants
    ///
    /// - `sample_rate_hz` is non-zero.
    /// - `block_size` is a power of two and at least 4.
    /// - Both bands are non-empty and lie within `block_size / 2` bins.
    /// - `calibration_frames` and `progress_interval` are at least 1.
    /// - `1 <= alarm_threshold <= window_size`.
    /// - Gains and the safety threshold are finite; gains are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::invalid_value("sample_rate_hz", "must be > 0"));
        }

        if self.block_size < 4 || !self.block_size.is_power_of_two() {
            return Err(ConfigError::invalid_value(
                "block_size",
                format!("{} is not a power of two >= 4", self.block_size),
            ));
        }

        let bins = self.spectrum_bins();
        for (field, band) in [("low_band", self.low_band), ("high_band", self.high_band)] {
            if band.is_empty() {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("[{}, {}) is empty", band.start, band.end),
                ));
            }
            if band.end > bins {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("[{}, {}) exceeds {bins} spectrum bins", band.start, band.end),
                ));
            }
        }

        if self.calibration_frames == 0 {
            return Err(ConfigError::invalid_value("calibration_frames", "must be > 0"));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::invalid_value("progress_interval", "must be > 0"));
        }

        if self.window_size == 0 {
            return Err(ConfigError::invalid_value("window_size", "must be > 0"));
        }
        if self.alarm_threshold == 0 || self.alarm_threshold > self.window_size {
            return Err(ConfigError::invalid_value(
                "alarm_threshold",
                format!("must be in [1, {}]", self.window_size),
            ));
        }

        if !self.input_gain.is_finite() || self.input_gain <= 0.0 {
            return Err(ConfigError::invalid_value("input_gain", "must be finite and > 0"));
        }
        if !self.low_gain.is_finite() || self.low_gain <= 0.0 {
            return Err(ConfigError::invalid_value("low_gain", "must be finite and > 0"));
        }
        if !self.safety_threshold.is_finite() {
            return Err(ConfigError::invalid_value("safety_threshold", "must be finite"));
        }

        Ok(())
    }
}
