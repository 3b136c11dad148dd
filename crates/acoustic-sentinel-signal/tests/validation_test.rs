//! Validation tests comparing the signal chain against known results.

use std::f32::consts::PI;
use std::time::Instant;

use acoustic_sentinel_core::{SentinelConfig, SpectralAnalyzer};
use acoustic_sentinel_signal::{remove_dc, BlockAccumulator, FeatureExtractor, FftSpectralAnalyzer};

fn tone(freq: f32, amp: f32, offset: f32, n: usize, sample_rate: f32) -> Vec<f32> {
    (0..n)
        .map(|i| offset + amp * (2.0 * PI * freq * i as f32 / sample_rate).sin())
        .collect()
}

fn analyze(cfg: &SentinelConfig, samples: &[f32]) -> acoustic_sentinel_core::RawBandEnergy {
    let mut acc = BlockAccumulator::new(cfg.block_size);
    let mut fft = FftSpectralAnalyzer::new(cfg.block_size, cfg.sample_rate_hz as f32).unwrap();
    let features = FeatureExtractor::from_config(cfg).unwrap();
    let now = Instant::now();

    let mut result = None;
    for &s in samples {
        if let Some(block) = acc.push(s, now) {
            remove_dc(block);
            fft.compute(block).unwrap();
            result = Some(features.extract(fft.spectrum(), fft.dominant_frequency()));
        }
    }
    result.expect("one full block")
}

/// A low-frequency fault tone raises the low band far above the high band.
#[test]
fn low_frequency_tone_lands_in_low_band() {
    let cfg = SentinelConfig::default();
    let raw = analyze(&cfg, &tone(200.0, 0.3, 0.0, cfg.block_size, 16_000.0));

    println!("200 Hz tone: low={:.3} high={:.3} dom={:.1}", raw.low, raw.high, raw.dominant_hz);
    assert!(raw.low > raw.high + 2.0, "low={} high={}", raw.low, raw.high);
    assert!((raw.dominant_hz - 200.0).abs() < 16.0);
}

/// A keyboard-like high tone shows up in the high band instead.
#[test]
fn high_frequency_tone_lands_in_high_band() {
    let cfg = SentinelConfig::default();
    let raw = analyze(&cfg, &tone(4000.0, 0.3, 0.0, cfg.block_size, 16_000.0));

    assert!(raw.high > raw.low + 2.0, "low={} high={}", raw.low, raw.high);
    assert!((raw.dominant_hz - 4000.0).abs() < 16.0);
}

/// DC bias must not leak into the features once the block is centred.
#[test]
fn dc_bias_does_not_change_features() {
    let cfg = SentinelConfig::default();
    let clean = analyze(&cfg, &tone(500.0, 0.2, 0.0, cfg.block_size, 16_000.0));
    let biased = analyze(&cfg, &tone(500.0, 0.2, 3.0, cfg.block_size, 16_000.0));

    assert!((clean.low - biased.low).abs() < 1e-2, "clean={} biased={}", clean.low, biased.low);
    assert!((clean.high - biased.high).abs() < 1e-2);
}

/// Silence produces exactly zero energies and no dominant frequency.
#[test]
fn silence_is_all_zero() {
    let cfg = SentinelConfig::default();
    let raw = analyze(&cfg, &vec![0.0; cfg.block_size]);
    assert_eq!(raw.low, 0.0);
    assert_eq!(raw.high, 0.0);
    assert_eq!(raw.dominant_hz, 0.0);
}
