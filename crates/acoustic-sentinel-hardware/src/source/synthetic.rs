//! Seeded synthetic microphone signal.
//!
//! Background is a steady mains-like hum plus uniform noise. Scheduled
//! [`FaultBurst`]s add a low-frequency tone, the signature of a failing
//! bearing or motor.

use std::f64::consts::TAU;

use acoustic_sentinel_core::{MicFrame, SampleRead, SampleSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A fault tone active over a range of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultBurst {
    /// First sample index of the burst.
    pub start: u64,
    /// Burst length in samples.
    pub len: u64,
    /// Tone frequency in Hz.
    pub freq_hz: f32,
    /// Tone amplitude before input gain.
    pub amplitude: f32,
}

impl FaultBurst {
    /// Burst covering `blocks` whole blocks starting at block `first_block`.
    #[must_use]
    pub fn blocks(
        first_block: u64,
        blocks: u64,
        block_size: usize,
        freq_hz: f32,
        amplitude: f32,
    ) -> Self {
        let n = block_size as u64;
        Self {
            start: first_block * n,
            len: blocks * n,
            freq_hz,
            amplitude,
        }
    }

    fn contains(&self, sample: u64) -> bool {
        sample >= self.start && sample - self.start < self.len
    }
}

/// Deterministic sample generator.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: StdRng,
    sample_rate_hz: f32,
    hum_hz: f32,
    hum_amplitude: f32,
    noise_amplitude: f32,
    miss_probability: f64,
    bursts: Vec<FaultBurst>,
    limit: Option<u64>,
    index: u64,
}

impl SyntheticSource {
    /// Quiet background at `sample_rate_hz` seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64, sample_rate_hz: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sample_rate_hz: sample_rate_hz as f32,
            hum_hz: 100.0,
            hum_amplitude: 0.002,
            noise_amplitude: 0.0005,
            miss_probability: 0.0,
            bursts: Vec::new(),
            limit: None,
            index: 0,
        }
    }

    /// Set the background hum.
    #[must_use]
    pub fn with_hum(mut self, freq_hz: f32, amplitude: f32) -> Self {
        self.hum_hz = freq_hz;
        self.hum_amplitude = amplitude;
        self
    }

    /// Set the peak uniform noise amplitude.
    #[must_use]
    pub fn with_noise(mut self, amplitude: f32) -> Self {
        self.noise_amplitude = amplitude.abs();
        self
    }

    /// Report a miss instead of a frame with probability `p`.
    #[must_use]
    pub fn with_miss_probability(mut self, p: f64) -> Self {
        self.miss_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Add a fault burst.
    #[must_use]
    pub fn with_burst(mut self, burst: FaultBurst) -> Self {
        self.bursts.push(burst);
        self
    }

    /// End the stream after `samples` frames.
    #[must_use]
    pub fn with_limit(mut self, samples: u64) -> Self {
        self.limit = Some(samples);
        self
    }

    /// Frames generated so far.
    #[must_use]
    pub fn generated(&self) -> u64 {
        self.index
    }

    fn next_sample(&mut self) -> f32 {
        let t = self.index as f64 / f64::from(self.sample_rate_hz);
        let mut sample = self.hum_amplitude * tone(self.hum_hz, t);
        if self.noise_amplitude > 0.0 {
            sample += self.rng.gen_range(-self.noise_amplitude..self.noise_amplitude);
        }
        for burst in self.bursts.iter().filter(|b| b.contains(self.index)) {
            sample += burst.amplitude * tone(burst.freq_hz, t);
        }
        sample
    }
}

fn tone(freq_hz: f32, t: f64) -> f32 {
    (TAU * f64::from(freq_hz) * t).sin() as f32
}

impl SampleSource for SyntheticSource {
    fn read(&mut self) -> SampleRead {
        if self.limit.is_some_and(|limit| self.index >= limit) {
            return SampleRead::EndOfStream;
        }
        if self.miss_probability > 0.0 && self.rng.gen_bool(self.miss_probability) {
            return SampleRead::Miss;
        }
        let sample = self.next_sample();
        self.index += 1;
        SampleRead::Frame(MicFrame::new([sample; 4]))
    }
}
