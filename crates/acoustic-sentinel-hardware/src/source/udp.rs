//! Live microphone packets over UDP.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use acoustic_sentinel_core::{SampleRead, SampleSource};
use tracing::{debug, warn};

use super::FrameQueue;
use crate::error::SourceError;
use crate::packet::{MicPacketParser, MAX_PACKET_LEN};

/// Default receive timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Receives microphone packets on a UDP socket.
///
/// Each [`read`](SampleSource::read) returns a queued frame if one is
/// available; otherwise it waits at most the read timeout for one datagram.
#[derive(Debug)]
pub struct UdpMicSource {
    socket: UdpSocket,
    buf: Vec<u8>,
    queue: FrameQueue,
    malformed: u64,
}

impl UdpMicSource {
    /// Bind to `addr` (e.g. `0.0.0.0:5005`) with the default read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Bind`] if the address is invalid or the socket
    /// cannot be bound.
    pub fn bind(addr: &str) -> Result<Self, SourceError> {
        let bind_err = |source| SourceError::Bind {
            addr: addr.to_string(),
            source,
        };
        let parsed: SocketAddr = addr
            .parse()
            .map_err(|e| bind_err(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let socket = UdpSocket::bind(parsed).map_err(bind_err)?;
        Self::from_socket(socket, DEFAULT_READ_TIMEOUT).map_err(bind_err)
    }

    /// Wrap an existing socket, applying `timeout` to every receive.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the timeout cannot be set.
    pub fn from_socket(socket: UdpSocket, timeout: Duration) -> io::Result<Self> {
        socket.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        Ok(Self {
            socket,
            buf: vec![0; MAX_PACKET_LEN],
            queue: FrameQueue::default(),
            malformed: 0,
        })
    }

    /// Local socket address.
    ///
    /// # Errors
    ///
    /// Propagates the socket error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Datagrams that failed to parse.
    #[must_use]
    pub fn malformed_packets(&self) -> u64 {
        self.malformed
    }

    /// Packets inferred lost from sequence gaps.
    #[must_use]
    pub fn dropped_packets(&self) -> u64 {
        self.queue.sequence.dropped()
    }

    /// Frames waiting to be read.
    #[must_use]
    pub fn queued_frames(&self) -> usize {
        self.queue.len()
    }

    fn receive(&mut self) {
        match self.socket.recv_from(&mut self.buf) {
            Ok((n, src)) => match MicPacketParser::parse_packet(&self.buf[..n]) {
                Ok((packet, _)) => {
                    let gap = self.queue.push_packet(packet);
                    if gap > 0 {
                        debug!(%src, gap, "sequence gap in microphone stream");
                    }
                }
                Err(err) => {
                    self.malformed += 1;
                    debug!(%src, bytes = n, %err, "dropping malformed packet");
                }
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(e) => warn!(error = %e, "UDP receive failed"),
        }
    }
}

impl SampleSource for UdpMicSource {
    fn read(&mut self) -> SampleRead {
        if self.queue.is_empty() {
            self.receive();
        }
        self.queue.pop().map_or(SampleRead::Miss, SampleRead::Frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (UdpMicSource, UdpSocket) {
        let source = UdpMicSource::bind("127.0.0.1:0").unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.connect(source.local_addr().unwrap()).unwrap();
        (source, sender)
    }

    #[test]
    fn idle_socket_misses() {
        let (mut source, _sender) = pair();
        assert_eq!(source.read(), SampleRead::Miss);
    }

    #[test]
    fn frames_are_handed_out_one_per_read() {
        let (mut source, sender) = pair();
        let packet = MicPacketParser::encode_packet(0, &[[10_000, 0, 0, 0], [20_000, 0, 0, 0]]);
        sender.send(&packet).unwrap();

        let mut got = Vec::new();
        for _ in 0..200 {
            if let SampleRead::Frame(frame) = source.read() {
                got.push(frame.samples[0]);
                if got.len() == 2 {
                    break;
                }
            }
        }
        assert_eq!(got, vec![1.0, 2.0]);
        assert_eq!(source.queued_frames(), 0);
    }

    #[test]
    fn malformed_datagram_is_a_miss() {
        let (mut source, sender) = pair();
        sender.send(&[1, 2, 3]).unwrap();
        for _ in 0..200 {
            assert_eq!(source.read(), SampleRead::Miss);
            if source.malformed_packets() == 1 {
                return;
            }
        }
        panic!("malformed packet was never received");
    }

    #[test]
    fn bad_address_is_reported() {
        assert!(matches!(
            UdpMicSource::bind("not-an-address"),
            Err(SourceError::Bind { .. })
        ));
    }
}
