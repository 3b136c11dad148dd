//! Error types for packet parsing and device access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing microphone packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not enough bytes in the buffer to parse a complete packet.
    #[error("Insufficient data: need {needed} bytes, got {got}")]
    InsufficientData {
        needed: usize,
        got: usize,
    },

    /// The packet header magic doesn't match.
    #[error("Invalid magic: expected {expected:#010x}, got {got:#010x}")]
    InvalidMagic {
        expected: u32,
        got: u32,
    },

    /// The header announces more frames than a packet may carry.
    #[error("Invalid frame count: {count} (max {max})")]
    InvalidFrameCount {
        count: usize,
        max: usize,
    },
}

/// Errors raised while opening or driving a device.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The UDP socket could not be bound or configured.
    #[error("Cannot bind UDP socket on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A replay file could not be opened.
    #[error("Cannot open replay file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The LED brightness file could not be written.
    #[error("Cannot drive LED at {path}: {source}")]
    Led {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
