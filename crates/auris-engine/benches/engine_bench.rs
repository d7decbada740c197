//! Criterion benchmark for the full per-frame dispatch
//!
//! Run with: cargo bench -p auris-engine

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::f32::consts::PI;

use auris_engine::{AnalysisFrame, Engine, EngineConfig, ModuleKind, ModuleSet};

const SAMPLE_RATE: u32 = 48000;
const FFT_SIZE: usize = 4096;

fn tone_frame(index: u64) -> AnalysisFrame {
    let samples: Vec<f32> = (0..FFT_SIZE)
        .map(|i| {
            let t = (index as usize * FFT_SIZE + i) as f32 / SAMPLE_RATE as f32;
            0.6 * (2.0 * PI * 440.0 * t).sin() + 0.2 * (2.0 * PI * 880.0 * t).sin()
        })
        .collect();
    let spectrum: Vec<f32> = (0..FFT_SIZE / 2)
        .map(|bin| if bin == 38 || bin == 75 { -8.0 } else { -80.0 })
        .collect();
    AnalysisFrame::new(
        samples,
        spectrum,
        SAMPLE_RATE,
        FFT_SIZE,
        index,
        index as f64 * FFT_SIZE as f64 / SAMPLE_RATE as f64,
    )
}

fn bench_full_catalog(c: &mut Criterion) {
    let mut engine = Engine::new(EngineConfig::default(), SAMPLE_RATE).unwrap();
    let frame = tone_frame(0);
    c.bench_function("engine_process_all_modules", |b| {
        b.iter(|| black_box(engine.process(black_box(&frame)).unwrap()))
    });
}

fn bench_metering_subset(c: &mut Criterion) {
    let config = EngineConfig {
        modules: ModuleSet::empty()
            .with(ModuleKind::Loudness)
            .with(ModuleKind::TruePeak)
            .with(ModuleKind::Clipping)
            .with(ModuleKind::Dynamics),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config, SAMPLE_RATE).unwrap();
    let frame = tone_frame(0);
    c.bench_function("engine_process_metering_only", |b| {
        b.iter(|| black_box(engine.process(black_box(&frame)).unwrap()))
    });
}

criterion_group!(benches, bench_full_catalog, bench_metering_subset);
criterion_main!(benches);
