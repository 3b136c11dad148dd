//! # acoustic-sentinel-core
//!
//! Core types, configuration, ports and errors for the acoustic-sentinel
//! anomaly detector.
//!
//! - **Configuration**: [`SentinelConfig`] with JSON loading and validation.
//! - **Domain types**: [`DetectionLabel`], [`AlarmState`], [`FeatureVector`],
//!   [`RawBandEnergy`], [`MicFrame`] and [`MicChannel`].
//! - **Ports**: [`SampleSource`], [`SpectralAnalyzer`], [`PredictiveModel`]
//!   and [`AlarmIndicator`], implemented by the signal, detect and hardware
//!   crates.
//! - **Ring buffer**: [`RingWindow`], the fixed-capacity history used by the
//!   hysteresis filter.
//!
//! ## Example
//!
//! ```rust
//! use acoustic_sentinel_core::{AlarmState, RingWindow, DetectionLabel};
//!
//! let mut window = RingWindow::new(6);
//! window.push(DetectionLabel::Anomaly);
//! let faults = window.iter().filter(|l| l.is_anomaly()).count();
//! assert_eq!(AlarmState::from_fault_count(faults, 2), AlarmState::Observing);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod ring;
pub mod traits;
pub mod types;

pub use config::{BandRange, SentinelConfig};
pub use error::{ConfigError, ModelError, SentinelError, SentinelResult, SignalError};
pub use ring::RingWindow;
pub use traits::{AlarmIndicator, PredictiveModel, SampleRead, SampleSource, SpectralAnalyzer};
pub use types::{AlarmState, DetectionLabel, FeatureVector, MicChannel, MicFrame, RawBandEnergy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{BandRange, SentinelConfig};
    pub use crate::error::{SentinelError, SentinelResult};
    pub use crate::traits::{
        AlarmIndicator, PredictiveModel, SampleRead, SampleSource, SpectralAnalyzer,
    };
    pub use crate::types::{
        AlarmState, DetectionLabel, FeatureVector, MicChannel, MicFrame, RawBandEnergy,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }
}
