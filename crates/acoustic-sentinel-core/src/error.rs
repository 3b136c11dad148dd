//! Error types for the acoustic-sentinel system.
//!
//! # Error Hierarchy
//!
//! - [`SentinelError`]: top-level error that encompasses all subsystem errors
//! - [`ConfigError`]: configuration loading and validation
//! - [`SignalError`]: spectral analysis and block handling
//! - [`ModelError`]: predictive model artifact loading
//!
//! Acquisition misses are deliberately *not* errors: a missing or invalid
//! sample is reported as [`SampleRead::Miss`](crate::traits::SampleRead) and
//! silently dropped by the control loop.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized `Result` type for top-level operations.
pub type SentinelResult<T> = Result<T, SentinelError>;

/// Top-level error type for the acoustic-sentinel system.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentinelError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Signal processing error
    #[error("Signal processing error: {0}")]
    Signal(#[from] SignalError),

    /// Predictive model error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Errors produced while loading or validating a [`SentinelConfig`](crate::SentinelConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("Cannot access config file {path}: {source}")]
    FileRead {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A field holds a value that violates its invariant.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Offending field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors related to spectral analysis of audio blocks.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SignalError {
    /// Block length does not match the analyzer size.
    #[error("Invalid block length: expected {expected}, got {actual}")]
    InvalidBlockLength {
        /// Expected number of samples
        expected: usize,
        /// Actual number of samples
        actual: usize,
    },

    /// Block size is not a power of two.
    #[error("Block size {size} is not a power of two")]
    NotPowerOfTwo {
        /// The rejected size
        size: usize,
    },

    /// Frequency band lies outside the spectrum.
    #[error("Band [{start}, {end}) is outside a spectrum of {bins} bins")]
    BandOutOfRange {
        /// First bin (inclusive)
        start: usize,
        /// Last bin (exclusive)
        end: usize,
        /// Number of bins in the spectrum
        bins: usize,
    },
}

/// Errors produced while loading a predictive model artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact file could not be read.
    #[error("Cannot read model file {path}: {source}")]
    FileRead {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON for the expected schema.
    #[error("Malformed model artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The artifact parsed but describes an unusable model.
    #[error("Invalid model structure: {0}")]
    InvalidStructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_sentinel_error() {
        let err: SentinelError = ConfigError::invalid_value("block_size", "must be > 0").into();
        assert!(matches!(err, SentinelError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for `block_size`: must be > 0"
        );
    }

    #[test]
    fn signal_error_display() {
        let err = SignalError::InvalidBlockLength {
            expected: 1024,
            actual: 512,
        };
        assert_eq!(err.to_string(), "Invalid block length: expected 1024, got 512");
    }
}
