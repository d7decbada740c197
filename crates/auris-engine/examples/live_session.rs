//! Offline demo of a monitoring session.
//!
//! Synthesizes a few seconds of program material (a 440 Hz tone with a click
//! track and one deliberate clip), feeds it through the engine frame by
//! frame the way a capture loop would, and prints the running meters plus
//! the session summary.
//!
//! Run with: cargo run -p auris-engine --example live_session

use std::f32::consts::PI;

use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

use auris_engine::{AnalysisFrame, Engine, EngineConfig, SessionAggregate};

const SAMPLE_RATE: u32 = 48000;
const FFT_SIZE: usize = 4096;

fn magnitude_db(samples: &[f32]) -> Vec<f32> {
    let mut windowed = samples.to_vec();
    auris_dsp::Window::Hann.apply(&mut windowed);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let mut buffer: Vec<Complex<f32>> =
        windowed.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    let scale = 4.0 / FFT_SIZE as f32;
    buffer[..FFT_SIZE / 2]
        .iter()
        .map(|c| (20.0 * (c.norm() * scale).max(1e-10).log10()).clamp(-100.0, 0.0))
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut engine = Engine::new(EngineConfig::default(), SAMPLE_RATE)
        .expect("default config is valid");
    let mut session = SessionAggregate::new();

    let seconds = 5.0;
    let frames = (seconds * SAMPLE_RATE as f64 / FFT_SIZE as f64) as u64;
    println!("processing {frames} frames of synthetic program material\n");

    for index in 0..frames {
        let start = index as usize * FFT_SIZE;
        let mut samples: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                let t = (start + i) as f32 / SAMPLE_RATE as f32;
                // Tone plus a short click every 500 ms
                let tone = 0.4 * (2.0 * PI * 440.0 * t).sin();
                let phase_in_beat = t % 0.5;
                let click = if phase_in_beat < 0.01 {
                    0.5 * (2.0 * PI * 2000.0 * t).sin()
                } else {
                    0.0
                };
                tone + click
            })
            .collect();
        // One deliberate clip halfway through
        if index == frames / 2 {
            samples[100] = 1.0;
        }

        let spectrum = magnitude_db(&samples);
        let timestamp = start as f64 / f64::from(SAMPLE_RATE);
        let frame = AnalysisFrame::new(
            samples,
            spectrum,
            SAMPLE_RATE,
            FFT_SIZE,
            index,
            timestamp,
        );

        let result = engine.process(&frame).expect("frame meets the contract");

        if index % 10 == 0 {
            let loudness = result.loudness.as_ref().unwrap();
            let pitch = result.pitch.as_ref().unwrap();
            println!(
                "frame {index:3}  M {:7.2} LUFS  pitch {:6.1} Hz ({})  BPM {:5.1}",
                loudness.momentary_lufs,
                pitch.frequency,
                pitch
                    .note
                    .map(|n| format!("{}{}", n.name, n.octave))
                    .unwrap_or_else(|| "-".into()),
                result.onset.as_ref().unwrap().bpm,
            );
        }
        session.fold(&result);
    }

    println!("\nevents:");
    for event in engine.drain_events() {
        println!("  {event:?}");
    }

    println!("\nsession summary:");
    println!("  frames:          {}", session.frames);
    println!("  max true peak:   {:.2} dBTP", session.max_true_peak_dbtp);
    println!("  integrated:      {:.2} LUFS", session.integrated_lufs);
    println!("  clip events:     {}", session.clip_events);
    println!("  feedback events: {}", session.feedback_events);
    if let Some(bpm) = session.last_bpm {
        println!("  tempo:           {bpm:.1} BPM");
    }
    if let Some(key) = &session.last_key {
        println!("  key:             {key}");
    }
}
