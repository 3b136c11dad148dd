//! Ports between the detection core and its collaborators.
//!
//! - [`SampleSource`]: non-blocking multi-channel microphone read
//! - [`SpectralAnalyzer`]: windowed magnitude spectrum of one block
//! - [`PredictiveModel`]: feature vector to binary label
//! - [`AlarmIndicator`]: binary actuator driven by the alarm pulse timer
//!
//! Every port is object safe so the CLI can pick adapters at runtime, and
//! every port has a trivial test double in the crates that consume it.

use crate::error::SignalError;
use crate::types::{DetectionLabel, FeatureVector, MicFrame};

/// Outcome of a single sample read attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleRead {
    /// One validated sample per channel.
    Frame(MicFrame),
    /// Nothing valid arrived within the read timeout.
    Miss,
    /// The source is finite and has been fully consumed.
    EndOfStream,
}

/// Multi-channel microphone input.
///
/// `read` must return within a short bounded timeout (10 ms or less) and
/// must never block indefinitely; it is the only suspension point of the
/// control loop.
pub trait SampleSource {
    /// Attempt to read one frame.
    fn read(&mut self) -> SampleRead;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self) -> SampleRead {
        (**self).read()
    }
}

/// Frequency transform over one fixed-size block.
pub trait SpectralAnalyzer {
    /// Window and transform `block`, replacing the previous spectrum.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidBlockLength`] when `block` does not
    /// match the analyzer size.
    fn compute(&mut self, block: &[f32]) -> Result<(), SignalError>;

    /// Magnitudes of the first `N/2` bins of the last computed block.
    fn spectrum(&self) -> &[f32];

    /// Frequency of the strongest non-DC bin in Hz.
    fn dominant_frequency(&self) -> f32;
}

/// Deterministic, stateless classifier over a [`FeatureVector`].
pub trait PredictiveModel {
    /// Predict a label. Must be pure and bounded in latency.
    fn predict(&self, features: &FeatureVector) -> DetectionLabel;
}

impl<M: PredictiveModel + ?Sized> PredictiveModel for Box<M> {
    fn predict(&self, features: &FeatureVector) -> DetectionLabel {
        (**self).predict(features)
    }
}

impl<M: PredictiveModel + ?Sized> PredictiveModel for &M {
    fn predict(&self, features: &FeatureVector) -> DetectionLabel {
        (**self).predict(features)
    }
}

/// Binary alarm actuator (LED, buzzer, relay).
///
/// Pulse timing is owned by the caller; implementations only switch levels
/// and must not block.
pub trait AlarmIndicator {
    /// Drive the actuator on or off.
    fn set_active(&mut self, active: bool);
}

impl<I: AlarmIndicator + ?Sized> AlarmIndicator for Box<I> {
    fn set_active(&mut self, active: bool) {
        (**self).set_active(active);
    }
}
