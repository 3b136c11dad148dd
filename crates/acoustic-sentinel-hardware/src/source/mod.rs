//! [`SampleSource`](acoustic_sentinel_core::SampleSource) adapters.
//!
//! - [`UdpMicSource`]: live packets from a microphone node.
//! - [`ReplaySource`]: recorded packets from any reader.
//! - [`SyntheticSource`]: seeded background noise with scheduled fault tones.

mod replay;
mod synthetic;
mod udp;

pub use replay::ReplaySource;
pub use synthetic::{FaultBurst, SyntheticSource};
pub use udp::{UdpMicSource, DEFAULT_READ_TIMEOUT};

use std::collections::VecDeque;

use acoustic_sentinel_core::MicFrame;

use crate::packet::{MicPacket, SequenceTracker};

/// Frames decoded from packets, handed out one per read.
#[derive(Debug, Default)]
struct FrameQueue {
    frames: VecDeque<MicFrame>,
    sequence: SequenceTracker,
}

impl FrameQueue {
    fn push_packet(&mut self, packet: MicPacket) -> u32 {
        let gap = self.sequence.update(packet.sequence);
        self.frames.extend(packet.frames);
        gap
    }

    fn pop(&mut self) -> Option<MicFrame> {
        self.frames.pop_front()
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
