//! Dynamics metering: RMS, peak, crest factor and dynamic-range scoring.
//!
//! Per-frame levels feed 300-frame rolling histories; the spread between
//! mean peak and mean RMS over that window scores the program's dynamic
//! range, and a derived compression estimate shrinks toward 1.0 as the
//! material flattens.

use auris_dsp::{Ring, linear_to_db};

/// Frames of level history kept for the dynamic-range score.
const HISTORY_FRAMES: usize = 300;
/// Dynamic-range span regarded as fully uncompressed, dB.
const DR_REFERENCE_DB: f32 = 20.0;

/// Dynamics measurements for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsResult {
    /// Frame RMS, dBFS. −∞ for silence.
    pub rms_db: f32,
    /// Frame peak, dBFS. −∞ for silence.
    pub peak_db: f32,
    /// Peak minus RMS, dB. Zero for silence.
    pub crest_db: f32,
    /// Mean peak minus mean RMS over the rolling history, dB.
    pub dynamic_range_db: f32,
    /// 0 = fully dynamic, 1 = fully compressed, derived from the DR score.
    pub compression_estimate: f32,
}

/// Rolling dynamics meter.
#[derive(Debug, Clone)]
pub struct DynamicsMeter {
    rms_history: Ring<f32>,
    peak_history: Ring<f32>,
}

impl DynamicsMeter {
    /// Create a meter with empty history.
    pub fn new() -> Self {
        Self {
            rms_history: Ring::new(HISTORY_FRAMES),
            peak_history: Ring::new(HISTORY_FRAMES),
        }
    }

    /// Measure one sample frame and update the rolling histories.
    ///
    /// Silent frames report −∞ levels and leave the histories untouched so
    /// the dynamic-range score reflects program material only.
    pub fn process(&mut self, samples: &[f32]) -> DynamicsResult {
        let (rms_db, peak_db) = frame_levels(samples);

        if rms_db.is_finite() && peak_db.is_finite() {
            self.rms_history.push(rms_db);
            self.peak_history.push(peak_db);
        }

        let crest_db = if rms_db.is_finite() && peak_db.is_finite() {
            peak_db - rms_db
        } else {
            0.0
        };

        let (dynamic_range_db, compression_estimate) = if self.rms_history.is_empty() {
            (0.0, 0.0)
        } else {
            let dr = (self.peak_history.mean() - self.rms_history.mean()).max(0.0);
            (dr, (1.0 - dr / DR_REFERENCE_DB).clamp(0.0, 1.0))
        };

        DynamicsResult {
            rms_db,
            peak_db,
            crest_db,
            dynamic_range_db,
            compression_estimate,
        }
    }

    /// Discard all history.
    pub fn reset(&mut self) {
        self.rms_history.clear();
        self.peak_history.clear();
    }
}

impl Default for DynamicsMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS and peak of one frame in dBFS.
fn frame_levels(samples: &[f32]) -> (f32, f32) {
    if samples.is_empty() {
        return (f32::NEG_INFINITY, f32::NEG_INFINITY);
    }
    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f32;
    for &s in samples {
        sum_sq += f64::from(s) * f64::from(s);
        peak = peak.max(s.abs());
    }
    let rms = (sum_sq / samples.len() as f64).sqrt() as f32;
    (linear_to_db(rms), linear_to_db(peak))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(amplitude: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * 440.0 * i as f32 / 48000.0).sin())
            .collect()
    }

    #[test]
    fn test_sine_levels() {
        let mut meter = DynamicsMeter::new();
        let result = meter.process(&sine(1.0, 48000));
        assert!((result.rms_db - (-3.01)).abs() < 0.1, "rms {}", result.rms_db);
        assert!(result.peak_db.abs() < 0.01, "peak {}", result.peak_db);
        assert!((result.crest_db - 3.01).abs() < 0.1);
    }

    #[test]
    fn test_silence_reports_neg_infinity() {
        let mut meter = DynamicsMeter::new();
        let result = meter.process(&vec![0.0; 4096]);
        assert_eq!(result.rms_db, f32::NEG_INFINITY);
        assert_eq!(result.peak_db, f32::NEG_INFINITY);
        assert_eq!(result.crest_db, 0.0);
        assert_eq!(result.dynamic_range_db, 0.0);
    }

    #[test]
    fn test_silence_does_not_pollute_history() {
        let mut meter = DynamicsMeter::new();
        meter.process(&sine(0.5, 4096));
        let before = meter.process(&sine(0.5, 4096)).dynamic_range_db;
        meter.process(&vec![0.0; 4096]);
        let after = meter.process(&sine(0.5, 4096)).dynamic_range_db;
        assert!(
            (before - after).abs() < 0.2,
            "DR drifted: {} -> {}",
            before,
            after
        );
        assert!(after.is_finite());
    }

    #[test]
    fn test_compression_estimate_tracks_crest() {
        // Square wave: crest factor 0 dB, reads as heavily compressed
        let mut meter = DynamicsMeter::new();
        let square: Vec<f32> = (0..4096)
            .map(|i| if (i / 64) % 2 == 0 { 0.8 } else { -0.8 })
            .collect();
        let mut result = meter.process(&square);
        for _ in 0..10 {
            result = meter.process(&square);
        }
        assert!(result.compression_estimate > 0.9);

        // Sine: ~3 dB crest, still mostly "compressed" on the 20 dB scale
        let mut meter = DynamicsMeter::new();
        let result = meter.process(&sine(1.0, 4096));
        assert!((result.dynamic_range_db - 3.01).abs() < 0.2);
        assert!(result.compression_estimate < 0.9);
    }

    #[test]
    fn test_history_capacity_bounded() {
        let mut meter = DynamicsMeter::new();
        for _ in 0..500 {
            meter.process(&sine(0.5, 256));
        }
        assert!(meter.rms_history.len() <= HISTORY_FRAMES);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut meter = DynamicsMeter::new();
        meter.process(&sine(1.0, 4096));
        meter.reset();
        let result = meter.process(&vec![0.0; 64]);
        assert_eq!(result.dynamic_range_db, 0.0);
    }
}
