//! acoustic-sentinel hardware interface.
//!
//! Adapters between the detection core and the outside world:
//!
//! - **Packet parsing**: [`MicPacketParser`] decodes the little-endian UDP
//!   packets streamed by a four-microphone I2S node.
//! - **Sample sources**: [`UdpMicSource`] (live), [`ReplaySource`] (recorded
//!   packets) and [`SyntheticSource`] (seeded noise with fault bursts), all
//!   implementing [`SampleSource`](acoustic_sentinel_core::SampleSource).
//! - **Indicators**: [`SysfsLedIndicator`] drives a Linux LED.
//!
//! No read blocks longer than the source timeout, and malformed input is a
//! miss rather than an error.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use acoustic_sentinel_core::{SampleRead, SampleSource};
//! use acoustic_sentinel_hardware::{MicPacketParser, ReplaySource};
//!
//! let bytes = MicPacketParser::encode_packet(0, &[[2_500, 0, 0, 0]]);
//! let mut source = ReplaySource::new(Cursor::new(bytes));
//! match source.read() {
//!     SampleRead::Frame(frame) => assert_eq!(frame.samples[0], 0.25),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert_eq!(source.read(), SampleRead::EndOfStream);
//! ```

mod error;
mod led;
mod packet;
mod source;

pub use error::{ParseError, SourceError};
pub use led::{SysfsLedIndicator, SYSFS_LED_ROOT};
pub use packet::{
    MicPacket, MicPacketParser, SequenceTracker, FRAME_LEN, HEADER_LEN, MAX_FRAMES_PER_PACKET,
    MAX_PACKET_LEN, MIC_PACKET_MAGIC, RAW_SCALE,
};
pub use source::{FaultBurst, ReplaySource, SyntheticSource, UdpMicSource, DEFAULT_READ_TIMEOUT};
