//! Recorded packet streams driven through the full detector.

use std::fs;
use std::sync::atomic::AtomicBool;

use acoustic_sentinel_core::{AlarmIndicator, SampleRead, SampleSource, SentinelConfig};
use acoustic_sentinel_detect::{DecisionForest, Monitor, SentinelPipeline};
use acoustic_sentinel_hardware::{
    FaultBurst, MicPacketParser, ReplaySource, SyntheticSource, MAX_FRAMES_PER_PACKET,
};

const BLOCK: usize = 1024;
const CALIBRATION: usize = 20;

#[derive(Debug, Default)]
struct Recorder {
    edges: Vec<bool>,
}

impl AlarmIndicator for Recorder {
    fn set_active(&mut self, active: bool) {
        self.edges.push(active);
    }
}

/// Encode every frame of `source` into packets of `per_packet` frames.
fn record(mut source: SyntheticSource, per_packet: usize) -> Vec<u8> {
    let mut data = Vec::new();
    let mut frames = Vec::with_capacity(per_packet);
    let mut seq = 0u32;
    loop {
        let done = match source.read() {
            SampleRead::Frame(frame) => {
                frames.push(frame.samples.map(MicPacketParser::to_raw));
                false
            }
            SampleRead::Miss => false,
            SampleRead::EndOfStream => true,
        };
        if frames.len() == per_packet || (done && !frames.is_empty()) {
            data.extend(MicPacketParser::encode_packet(seq, &frames));
            frames.clear();
            seq += 1;
        }
        if done {
            return data;
        }
    }
}

fn config() -> SentinelConfig {
    SentinelConfig {
        calibration_frames: CALIBRATION,
        ..SentinelConfig::default()
    }
}

#[test]
fn recorded_fault_raises_alarm() {
    let blocks = (CALIBRATION + 15) as u64;
    let burst = FaultBurst::blocks(CALIBRATION as u64 + 5, 3, BLOCK, 250.0, 0.01);
    let source = SyntheticSource::new(11, 16_000)
        .with_burst(burst)
        .with_limit(blocks * BLOCK as u64);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.bin");
    fs::write(&path, record(source, 256)).unwrap();

    let replay = ReplaySource::open(&path).unwrap();
    let pipeline = SentinelPipeline::new(config(), DecisionForest::embedded().unwrap()).unwrap();
    let mut monitor = Monitor::new(replay, pipeline, Recorder::default());

    let stats = monitor.run(&AtomicBool::new(false), None);
    assert_eq!(stats.blocks, blocks);
    assert_eq!(stats.frames, blocks * BLOCK as u64);
    assert!(stats.alarm_blocks >= 2, "{stats:?}");
    assert!(stats.pulses >= 1);

    let (source, _, indicator) = monitor.into_parts();
    assert_eq!(source.dropped_packets(), 0);
    assert!(indicator.edges.contains(&true));
    assert_eq!(indicator.edges.last(), Some(&false));
}

#[test]
fn block_limit_stops_replay() {
    let source = SyntheticSource::new(5, 16_000).with_limit(10 * BLOCK as u64);
    let replay = ReplaySource::new(std::io::Cursor::new(record(source, MAX_FRAMES_PER_PACKET)));
    let pipeline = SentinelPipeline::new(config(), DecisionForest::embedded().unwrap()).unwrap();
    let mut monitor = Monitor::new(replay, pipeline, Recorder::default());

    let stats = monitor.run(&AtomicBool::new(false), Some(4));
    assert_eq!(stats.blocks, 4);
    assert!(monitor.pipeline().calibrator().frames() == 4);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ReplaySource::open(&dir.path().join("absent.bin")).is_err());
}
