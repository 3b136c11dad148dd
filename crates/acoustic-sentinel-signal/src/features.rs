//! Band-energy feature extraction.
//!
//! Reduces an `N/2`-bin magnitude spectrum to the raw triple consumed by the
//! calibrator and classifier:
//!
//! ```text
//! raw_low  = ln(1 + sum spectrum[low_band])
//! raw_high = ln(1 + sum spectrum[high_band])
//! dominant = peak frequency in Hz
//! ```
//!
//! The log compression dampens transient spikes so one loud click cannot
//! dominate the calibrated baseline.

use acoustic_sentinel_core::{BandRange, RawBandEnergy, SentinelConfig, SignalError};

/// Extracts log-compressed band energies from a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    low_band: BandRange,
    high_band: BandRange,
    bins: usize,
}

impl FeatureExtractor {
    /// Create an extractor for spectra of `bins` magnitudes.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::BandOutOfRange`] if either band is empty or
    /// extends past `bins`.
    pub fn new(low_band: BandRange, high_band: BandRange, bins: usize) -> Result<Self, SignalError> {
        for band in [low_band, high_band] {
            if band.is_empty() || band.end > bins {
                return Err(SignalError::BandOutOfRange {
                    start: band.start,
                    end: band.end,
                    bins,
                });
            }
        }
        Ok(Self {
            low_band,
            high_band,
            bins,
        })
    }

    /// Extractor using the bands and block size of `config`.
    ///
    /// # Errors
    ///
    /// See [`FeatureExtractor::new`].
    pub fn from_config(config: &SentinelConfig) -> Result<Self, SignalError> {
        Self::new(config.low_band, config.high_band, config.spectrum_bins())
    }

    /// Compute the raw band energies of one block.
    ///
    /// Spectra shorter than expected contribute only the bins they have.
    #[must_use]
    pub fn extract(&self, spectrum: &[f32], dominant_hz: f32) -> RawBandEnergy {
        RawBandEnergy {
            low: band_energy(spectrum, self.low_band),
            high: band_energy(spectrum, self.high_band),
            dominant_hz,
        }
    }

    /// Low band.
    #[must_use]
    pub fn low_band(&self) -> BandRange {
        self.low_band
    }

    /// High band.
    #[must_use]
    pub fn high_band(&self) -> BandRange {
        self.high_band
    }

    /// Expected spectrum length.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }
}

/// `ln(1 + sum)` of the magnitudes inside `band`.
#[must_use]
pub fn band_energy(spectrum: &[f32], band: BandRange) -> f32 {
    let end = band.end.min(spectrum.len());
    let start = band.start.min(end);
    spectrum[start..end].iter().sum::<f32>().ln_1p()
}
