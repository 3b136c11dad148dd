//! Windowed FFT magnitude spectrum of one audio block.
//!
//! [`FftSpectralAnalyzer`] implements the
//! [`SpectralAnalyzer`](acoustic_sentinel_core::SpectralAnalyzer) port on top
//! of `rustfft`. The plan, window table and buffers are allocated once at
//! construction, so [`compute`](SpectralAnalyzer::compute) does not allocate.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use acoustic_sentinel_core::{SignalError, SpectralAnalyzer};
use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// Symmetric Hamming window of `size` points.
pub fn hamming_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let n = (size - 1) as f32;
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / n).cos())
        .collect()
}

/// `rustfft`-backed spectral analyzer for blocks of a fixed power-of-two size.
pub struct FftSpectralAnalyzer {
    size: usize,
    sample_rate_hz: f32,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
    magnitudes: Vec<f32>,
    dominant_hz: f32,
}

impl FftSpectralAnalyzer {
    /// Hamming-windowed analyzer for `size`-sample blocks sampled at
    /// `sample_rate_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::NotPowerOfTwo`] if `size` is not a power of two
    /// of at least 4.
    pub fn new(size: usize, sample_rate_hz: f32) -> Result<Self, SignalError> {
        if size < 4 || !size.is_power_of_two() {
            return Err(SignalError::NotPowerOfTwo { size });
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            size,
            sample_rate_hz,
            window: hamming_window(size),
            fft,
            buffer: vec![Complex32::new(0.0, 0.0); size],
            scratch,
            magnitudes: vec![0.0; size / 2],
            dominant_hz: 0.0,
        })
    }

    /// Block size N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Width of one bin in Hz.
    #[must_use]
    pub fn bin_width_hz(&self) -> f32 {
        self.sample_rate_hz / self.size as f32
    }

    /// Magnitude of a single bin, or zero past Nyquist.
    #[must_use]
    pub fn magnitude(&self, bin: usize) -> f32 {
        self.magnitudes.get(bin).copied().unwrap_or(0.0)
    }
}

impl SpectralAnalyzer for FftSpectralAnalyzer {
    fn compute(&mut self, block: &[f32]) -> Result<(), SignalError> {
        if block.len() != self.size {
            return Err(SignalError::InvalidBlockLength {
                expected: self.size,
                actual: block.len(),
            });
        }

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(block).zip(&self.window) {
            *slot = Complex32::new(sample * w, 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (mag, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *mag = bin.norm();
        }
        self.dominant_hz = major_peak(&self.magnitudes, self.bin_width_hz());
        Ok(())
    }

    fn spectrum(&self) -> &[f32] {
        &self.magnitudes
    }

    fn dominant_frequency(&self) -> f32 {
        self.dominant_hz
    }
}

impl fmt::Debug for FftSpectralAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftSpectralAnalyzer")
            .field("size", &self.size)
            .field("sample_rate_hz", &self.sample_rate_hz)
            .field("dominant_hz", &self.dominant_hz)
            .finish_non_exhaustive()
    }
}

/// Frequency of the strongest non-DC bin, refined by parabolic interpolation.
///
/// Returns 0 Hz when every non-DC bin is zero.
pub fn major_peak(magnitudes: &[f32], bin_width_hz: f32) -> f32 {
    let mut peak_bin = 0;
    let mut peak = 0.0_f32;
    for (bin, &mag) in magnitudes.iter().enumerate().skip(1) {
        if mag > peak {
            peak = mag;
            peak_bin = bin;
        }
    }
    if peak_bin == 0 {
        return 0.0;
    }

    let delta = match magnitudes.get(peak_bin + 1) {
        Some(&right) => {
            let left = magnitudes[peak_bin - 1];
            let denom = left - 2.0 * peak + right;
            if denom.abs() > f32::EPSILON {
                (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    (peak_bin as f32 + delta) * bin_width_hz
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tone(freq: f32, amp: f32, size: usize, sample_rate: f32) -> Vec<f32> {
        (0..size)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(matches!(
            FftSpectralAnalyzer::new(1000, 16_000.0),
            Err(SignalError::NotPowerOfTwo { size: 1000 })
        ));
    }

    #[test]
    fn rejects_wrong_block_length() {
        let mut fft = FftSpectralAnalyzer::new(64, 16_000.0).unwrap();
        let err = fft.compute(&[0.0; 32]).unwrap_err();
        assert_eq!(
            err,
            SignalError::InvalidBlockLength {
                expected: 64,
                actual: 32
            }
        );
    }

    #[test]
    fn spectrum_has_half_block_bins() {
        let mut fft = FftSpectralAnalyzer::new(1024, 16_000.0).unwrap();
        fft.compute(&vec![0.0; 1024]).unwrap();
        assert_eq!(fft.spectrum().len(), 512);
    }

    #[test]
    fn silence_has_zero_spectrum_and_no_peak() {
        let mut fft = FftSpectralAnalyzer::new(256, 16_000.0).unwrap();
        fft.compute(&vec![0.0; 256]).unwrap();
        assert!(fft.spectrum().iter().all(|&m| m == 0.0));
        assert_eq!(fft.dominant_frequency(), 0.0);
    }

    #[test]
    fn pure_tone_peak_frequency() {
        let sample_rate = 16_000.0;
        let mut fft = FftSpectralAnalyzer::new(1024, sample_rate).unwrap();
        fft.compute(&tone(1000.0, 0.5, 1024, sample_rate)).unwrap();
        assert_abs_diff_eq!(fft.dominant_frequency(), 1000.0, epsilon = fft.bin_width_hz());
        assert!(fft.magnitude(64) > fft.magnitude(10) * 100.0);
    }

    #[test]
    fn off_bin_tone_is_interpolated() {
        let sample_rate = 16_000.0;
        let mut fft = FftSpectralAnalyzer::new(1024, sample_rate).unwrap();
        // 300 Hz sits between bins 19 and 20.
        fft.compute(&tone(300.0, 0.5, 1024, sample_rate)).unwrap();
        assert_abs_diff_eq!(fft.dominant_frequency(), 300.0, epsilon = 5.0);
    }

    #[test]
    fn hamming_window_is_symmetric() {
        let w = hamming_window(64);
        for i in 0..32 {
            assert_abs_diff_eq!(w[i], w[63 - i], epsilon = 1e-5);
        }
    }

    #[test]
    fn hamming_endpoints() {
        let w = hamming_window(1024);
        assert_abs_diff_eq!(w[0], 0.08, epsilon = 1e-5);
        assert_abs_diff_eq!(w[1023], 0.08, epsilon = 1e-5);
    }

    #[test]
    fn major_peak_skips_dc() {
        let mags = [100.0, 1.0, 5.0, 1.0];
        assert_abs_diff_eq!(major_peak(&mags, 10.0), 20.0, epsilon = 1e-4);
    }
}
