//! Microphone node packet parser.
//!
//! A microphone node samples four I2S microphones and streams batches of
//! frames over UDP. Replay files are plain concatenations of packets.
//!
//! # Binary Format
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic (0xA5D1_0001)
//! 4       4     Sequence number
//! 8       2     Frame count M (<= 512)
//! 10      16*M  Frames: 4 x i32 raw words (LT, LB, RT, RB)
//! ```
//!
//! All fields are little endian. Raw words are divided by 10 000 to obtain
//! the float samples the pipeline consumes.

use std::io::Cursor;

use acoustic_sentinel_core::MicFrame;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::ParseError;

/// Packet header magic.
pub const MIC_PACKET_MAGIC: u32 = 0xA5D1_0001;

/// Header length in bytes.
pub const HEADER_LEN: usize = 10;

/// Bytes per frame (four i32 words).
pub const FRAME_LEN: usize = 16;

/// Maximum frames in one packet.
pub const MAX_FRAMES_PER_PACKET: usize = 512;

/// Largest valid packet.
pub const MAX_PACKET_LEN: usize = HEADER_LEN + FRAME_LEN * MAX_FRAMES_PER_PACKET;

/// Divisor from raw I2S word to float sample.
pub const RAW_SCALE: f32 = 10_000.0;

/// One decoded packet.
#[derive(Debug, Clone, PartialEq)]
pub struct MicPacket {
    /// Sender sequence number.
    pub sequence: u32,
    /// Scaled frames in arrival order.
    pub frames: Vec<MicFrame>,
}

/// Parser for microphone node packets.
pub struct MicPacketParser;

impl MicPacketParser {
    /// Parse a single packet from the start of `data`.
    ///
    /// Returns the packet and the number of bytes consumed.
    pub fn parse_packet(data: &[u8]) -> Result<(MicPacket, usize), ParseError> {
        if data.len() < HEADER_LEN {
            return Err(ParseError::InsufficientData {
                needed: HEADER_LEN,
                got: data.len(),
            });
        }

        let mut cursor = Cursor::new(data);
        let (magic, sequence, count) = read_header(&mut cursor).map_err(|_| {
            ParseError::InsufficientData {
                needed: HEADER_LEN,
                got: data.len(),
            }
        })?;

        if magic != MIC_PACKET_MAGIC {
            return Err(ParseError::InvalidMagic {
                expected: MIC_PACKET_MAGIC,
                got: magic,
            });
        }
        if count > MAX_FRAMES_PER_PACKET {
            return Err(ParseError::InvalidFrameCount {
                count,
                max: MAX_FRAMES_PER_PACKET,
            });
        }

        let total = HEADER_LEN + count * FRAME_LEN;
        if data.len() < total {
            return Err(ParseError::InsufficientData {
                needed: total,
                got: data.len(),
            });
        }

        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            let mut samples = [0.0_f32; 4];
            for slot in &mut samples {
                // Length was checked above.
                let raw = cursor.read_i32::<LittleEndian>().unwrap_or(0);
                *slot = raw as f32 / RAW_SCALE;
            }
            frames.push(MicFrame::new(samples));
        }

        Ok((MicPacket { sequence, frames }, total))
    }

    /// Parse every complete packet in `data`, skipping garbage.
    ///
    /// Stops at a truncated trailing packet so the caller can retry once more
    /// bytes arrive. Returns the packets and the bytes consumed.
    pub fn parse_stream(data: &[u8]) -> (Vec<MicPacket>, usize) {
        let mut packets = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            match Self::parse_packet(&data[offset..]) {
                Ok((packet, consumed)) => {
                    packets.push(packet);
                    offset += consumed;
                }
                Err(ParseError::InsufficientData { .. }) if starts_with_magic(&data[offset..]) => {
                    break;
                }
                Err(ParseError::InsufficientData { .. }) if data.len() - offset < 4 => break,
                Err(_) => {
                    offset += 1;
                    while offset + 4 <= data.len() && !starts_with_magic(&data[offset..]) {
                        offset += 1;
                    }
                    if offset + 4 > data.len() {
                        break;
                    }
                }
            }
        }

        (packets, offset)
    }

    /// Encode raw frames as one packet.
    ///
    /// Frames beyond [`MAX_FRAMES_PER_PACKET`] are not written.
    pub fn encode_packet(sequence: u32, frames: &[[i32; 4]]) -> Vec<u8> {
        let frames = &frames[..frames.len().min(MAX_FRAMES_PER_PACKET)];
        let mut buf = Vec::with_capacity(HEADER_LEN + frames.len() * FRAME_LEN);
        buf.extend_from_slice(&MIC_PACKET_MAGIC.to_le_bytes());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&(frames.len() as u16).to_le_bytes());
        for frame in frames {
            for &word in frame {
                // Writing into a Vec cannot fail.
                let _ = buf.write_i32::<LittleEndian>(word);
            }
        }
        buf
    }

    /// Raw word for a float sample, the inverse of the parser scaling.
    #[must_use]
    pub fn to_raw(sample: f32) -> i32 {
        (sample * RAW_SCALE).round() as i32
    }
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, u32, usize)> {
    let magic = cursor.read_u32::<LittleEndian>()?;
    let sequence = cursor.read_u32::<LittleEndian>()?;
    let count = cursor.read_u16::<LittleEndian>()? as usize;
    Ok((magic, sequence, count))
}

fn starts_with_magic(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == MIC_PACKET_MAGIC.to_le_bytes()
}

/// Sequence gap tracking for one sender.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    last: Option<u32>,
    received: u64,
    dropped: u64,
}

impl SequenceTracker {
    /// Record a sequence number. Returns the number of packets skipped.
    pub fn update(&mut self, sequence: u32) -> u32 {
        self.received += 1;
        let gap = match self.last {
            Some(last) => {
                let expected = last.wrapping_add(1);
                if sequence > expected {
                    sequence - expected
                } else {
                    0
                }
            }
            None => 0,
        };
        self.dropped += u64::from(gap);
        self.last = Some(sequence);
        gap
    }

    /// Packets seen.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Packets inferred lost from sequence gaps.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<[i32; 4]> {
        (0..n as i32)
            .map(|i| [i * 10, -i * 10, 10_000, -20_000])
            .collect()
    }

    #[test]
    fn parse_valid_packet() {
        let data = MicPacketParser::encode_packet(7, &frames(3));
        let (packet, consumed) = MicPacketParser::parse_packet(&data).unwrap();
        assert_eq!(consumed, HEADER_LEN + 3 * FRAME_LEN);
        assert_eq!(packet.sequence, 7);
        assert_eq!(packet.frames.len(), 3);
        assert_eq!(packet.frames[2].samples, [0.002, -0.002, 1.0, -2.0]);
    }

    #[test]
    fn parse_insufficient_header() {
        assert_eq!(
            MicPacketParser::parse_packet(&[0u8; 4]),
            Err(ParseError::InsufficientData { needed: 10, got: 4 })
        );
    }

    #[test]
    fn parse_truncated_body() {
        let data = MicPacketParser::encode_packet(1, &frames(2));
        let err = MicPacketParser::parse_packet(&data[..data.len() - 1]).unwrap_err();
        assert!(matches!(err, ParseError::InsufficientData { needed: 42, .. }));
    }

    #[test]
    fn parse_invalid_magic() {
        let mut data = MicPacketParser::encode_packet(1, &frames(1));
        data[0] = 0xFF;
        assert!(matches!(
            MicPacketParser::parse_packet(&data),
            Err(ParseError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn parse_excessive_frame_count() {
        let mut data = MicPacketParser::encode_packet(1, &[]);
        data[8..10].copy_from_slice(&600u16.to_le_bytes());
        assert_eq!(
            MicPacketParser::parse_packet(&data),
            Err(ParseError::InvalidFrameCount { count: 600, max: 512 })
        );
    }

    #[test]
    fn encode_caps_frame_count() {
        let data = MicPacketParser::encode_packet(1, &frames(600));
        assert_eq!(data.len(), MAX_PACKET_LEN);
    }

    #[test]
    fn stream_with_garbage_between_packets() {
        let mut data = vec![0xFF, 0x00, 0x12];
        data.extend(MicPacketParser::encode_packet(1, &frames(2)));
        data.extend([0xAB; 5]);
        data.extend(MicPacketParser::encode_packet(2, &frames(1)));

        let (packets, consumed) = MicPacketParser::parse_stream(&data);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].sequence, 2);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn stream_keeps_truncated_tail() {
        let first = MicPacketParser::encode_packet(1, &frames(1));
        let second = MicPacketParser::encode_packet(2, &frames(4));
        let mut data = first.clone();
        data.extend_from_slice(&second[..20]);

        let (packets, consumed) = MicPacketParser::parse_stream(&data);
        assert_eq!(packets.len(), 1);
        assert_eq!(consumed, first.len());
    }

    #[test]
    fn raw_scaling_round_trips_within_resolution() {
        assert_eq!(MicPacketParser::to_raw(0.25), 2_500);
        assert_eq!(MicPacketParser::to_raw(-1.0), -10_000);
    }

    #[test]
    fn sequence_gaps_counted() {
        let mut tracker = SequenceTracker::default();
        assert_eq!(tracker.update(10), 0);
        assert_eq!(tracker.update(11), 0);
        assert_eq!(tracker.update(15), 3);
        assert_eq!(tracker.update(3), 0);
        assert_eq!(tracker.received(), 4);
        assert_eq!(tracker.dropped(), 3);
    }
}
