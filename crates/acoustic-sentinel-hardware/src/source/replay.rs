//! Recorded microphone packets.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use acoustic_sentinel_core::{SampleRead, SampleSource};
use tracing::{debug, warn};

use super::FrameQueue;
use crate::error::SourceError;
use crate::packet::MicPacketParser;

const CHUNK: usize = 4096;

/// Replays a concatenation of microphone packets from a reader.
///
/// Reports [`SampleRead::EndOfStream`] once the reader is exhausted and all
/// decoded frames have been handed out.
#[derive(Debug)]
pub struct ReplaySource<R> {
    reader: R,
    pending: Vec<u8>,
    queue: FrameQueue,
    exhausted: bool,
}

impl ReplaySource<BufReader<File>> {
    /// Replay a packet file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> ReplaySource<R> {
    /// Replay packets from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(CHUNK),
            queue: FrameQueue::default(),
            exhausted: false,
        }
    }

    /// Packets inferred lost from sequence gaps.
    #[must_use]
    pub fn dropped_packets(&self) -> u64 {
        self.queue.sequence.dropped()
    }

    /// Packets decoded so far.
    #[must_use]
    pub fn packets_read(&self) -> u64 {
        self.queue.sequence.received()
    }

    fn fill(&mut self) {
        let mut chunk = [0u8; CHUNK];
        match self.reader.read(&mut chunk) {
            Ok(0) => {
                self.exhausted = true;
                if !self.pending.is_empty() {
                    debug!(bytes = self.pending.len(), "ignoring trailing bytes in replay");
                    self.pending.clear();
                }
            }
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                let (packets, consumed) = MicPacketParser::parse_stream(&self.pending);
                self.pending.drain(..consumed);
                for packet in packets {
                    self.queue.push_packet(packet);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(error = %e, "replay read failed, ending stream");
                self.exhausted = true;
            }
        }
    }
}

impl<R: Read> SampleSource for ReplaySource<R> {
    fn read(&mut self) -> SampleRead {
        loop {
            if let Some(frame) = self.queue.pop() {
                return SampleRead::Frame(frame);
            }
            if self.exhausted {
                return SampleRead::EndOfStream;
            }
            self.fill();
        }
    }
}
