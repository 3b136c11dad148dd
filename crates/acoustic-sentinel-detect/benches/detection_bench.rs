//! Benchmarks for per-block detection.
//!
//! Run with: cargo bench --package acoustic-sentinel-detect

use std::f32::consts::PI;
use std::time::Instant;

use acoustic_sentinel_core::{FeatureVector, PredictiveModel, SentinelConfig};
use acoustic_sentinel_detect::{DecisionForest, SentinelPipeline};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_forest(c: &mut Criterion) {
    let forest = DecisionForest::embedded().unwrap();
    let x = FeatureVector {
        low: 0.3,
        high: 1.2,
        dominant_hz: 420.0,
    };
    c.bench_function("forest_predict", |b| b.iter(|| forest.predict(black_box(&x))));
}

fn bench_calibrated_block(c: &mut Criterion) {
    let config = SentinelConfig {
        calibration_frames: 1,
        ..SentinelConfig::default()
    };
    let n = config.block_size;
    let mut pipeline = SentinelPipeline::new(config, DecisionForest::embedded().unwrap()).unwrap();
    pipeline.process_block(&mut vec![0.0; n]).unwrap();

    let block: Vec<f32> = (0..n)
        .map(|i| 0.1 * (2.0 * PI * 240.0 * i as f32 / 16_000.0).sin())
        .collect();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("process_block", |b| {
        let mut work = block.clone();
        b.iter(|| {
            work.copy_from_slice(&block);
            black_box(pipeline.process_block(&mut work).unwrap())
        });
    });
    group.bench_function("push_sample_x1024", |b| {
        let now = Instant::now();
        b.iter(|| {
            let mut last = None;
            for &s in &block {
                last = pipeline.push_sample(Some(s), now).or(last);
            }
            black_box(last)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_forest, bench_calibrated_block);
criterion_main!(benches);
