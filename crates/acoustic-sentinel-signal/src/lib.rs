//! acoustic-sentinel signal processing.
//!
//! Turns a stream of validated microphone samples into per-block spectral
//! features:
//!
//! 1. **Accumulation** ([`BlockAccumulator`]): fixed-size blocks of N samples,
//!    with a stall reset for partial blocks.
//! 2. **Preconditioning** ([`remove_dc`]): per-block mean subtraction.
//! 3. **Spectral analysis** ([`FftSpectralAnalyzer`]): Hamming window, FFT,
//!    `N/2` magnitudes and the interpolated dominant frequency.
//! 4. **Feature extraction** ([`FeatureExtractor`]): log-compressed low/high
//!    band energies.
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use acoustic_sentinel_core::{SentinelConfig, SpectralAnalyzer};
//! use acoustic_sentinel_signal::{remove_dc, BlockAccumulator, FeatureExtractor, FftSpectralAnalyzer};
//!
//! let cfg = SentinelConfig::default();
//! let mut acc = BlockAccumulator::new(cfg.block_size);
//! let mut fft = FftSpectralAnalyzer::new(cfg.block_size, cfg.sample_rate_hz as f32).unwrap();
//! let features = FeatureExtractor::from_config(&cfg).unwrap();
//!
//! let now = Instant::now();
//! for i in 0..cfg.block_size {
//!     let sample = (i as f32 * 0.1).sin();
//!     if let Some(block) = acc.push(sample, now) {
//!         remove_dc(block);
//!         fft.compute(block).unwrap();
//!         let raw = features.extract(fft.spectrum(), fft.dominant_frequency());
//!         assert!(raw.low > 0.0);
//!     }
//! }
//! ```

pub mod block;
pub mod features;
pub mod precondition;
pub mod spectrum;

pub use block::BlockAccumulator;
pub use features::{band_energy, FeatureExtractor};
pub use precondition::remove_dc;
pub use spectrum::{hamming_window, major_peak, FftSpectralAnalyzer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::block::BlockAccumulator;
    pub use crate::features::FeatureExtractor;
    pub use crate::precondition::remove_dc;
    pub use crate::spectrum::FftSpectralAnalyzer;
    pub use acoustic_sentinel_core::SpectralAnalyzer;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
