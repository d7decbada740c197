//! Room acoustics: RT60 decay estimation and standing-wave detection.
//!
//! The RT60 tracker watches the rolling level history for a sharp drop after
//! sustained excitation, then times how long the level takes to fall 60 dB
//! below where the decay began. The standing-wave detector averages the
//! 20–300 Hz magnitudes over a short rolling window and flags buckets that
//! stand well above the band mean as room modes.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use auris_dsp::{Ring, linear_to_db};

/// Rolling (level, timestamp) entries kept by the RT60 tracker.
const LEVEL_HISTORY: usize = 500;
/// Entries averaged per comparison window.
const DECAY_WINDOW: usize = 10;
/// Seconds separating the old and recent comparison windows.
const DECAY_LOOKBACK_SECS: f64 = 0.4;
/// Level drop that starts decay tracking, dB.
const DECAY_TRIGGER_DB: f32 = 15.0;
/// The excitation level must exceed this for a decay to count, dBFS.
const MIN_EXCITATION_DB: f32 = -20.0;
/// Full decay measured, dB.
const DECAY_SPAN_DB: f32 = 60.0;
/// Level rebound that cancels an in-progress measurement, dB.
const RETRIGGER_MARGIN_DB: f32 = 5.0;

/// RT60 state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rt60Result {
    /// Last completed measurement, seconds. Zero until one completes.
    pub rt60_seconds: f32,
    /// True while a decay is being timed.
    pub decaying: bool,
    /// True once at least one measurement has completed.
    pub valid: bool,
}

/// Incremental RT60 estimator.
#[derive(Debug, Clone)]
pub struct Rt60Estimator {
    history: Ring<(f32, f64)>,
    decaying: bool,
    decay_start_level: f32,
    decay_start_time: f64,
    rt60_seconds: f32,
    valid: bool,
}

impl Rt60Estimator {
    /// Create an estimator with empty history.
    pub fn new() -> Self {
        Self {
            history: Ring::new(LEVEL_HISTORY),
            decaying: false,
            decay_start_level: 0.0,
            decay_start_time: 0.0,
            rt60_seconds: 0.0,
            valid: false,
        }
    }

    /// Feed one sample frame stamped with its capture time.
    pub fn process(&mut self, samples: &[f32], timestamp: f64) -> Rt60Result {
        let level_db = frame_rms_db(samples);
        self.history.push((level_db, timestamp));

        if self.decaying {
            if level_db > self.decay_start_level - RETRIGGER_MARGIN_DB {
                // Excitation returned before the decay finished
                self.decaying = false;
            } else if level_db <= self.decay_start_level - DECAY_SPAN_DB {
                self.rt60_seconds = (timestamp - self.decay_start_time) as f32;
                self.valid = true;
                self.decaying = false;
            }
        } else if let Some((old_level, old_time)) = self.decay_onset(timestamp) {
            self.decaying = true;
            self.decay_start_level = old_level;
            self.decay_start_time = old_time;
        }

        Rt60Result {
            rt60_seconds: self.rt60_seconds,
            decaying: self.decaying,
            valid: self.valid,
        }
    }

    /// Detect a decay onset: the recent window sits well below a window
    /// ending one lookback period earlier, and that older window was loud.
    /// Returns the older window's mean level and end time.
    fn decay_onset(&self, now: f64) -> Option<(f32, f64)> {
        let entries: Vec<(f32, f64)> = self.history.iter().collect();
        if entries.len() < DECAY_WINDOW * 2 {
            return None;
        }

        // Last entry at or before the lookback point
        let cutoff = now - DECAY_LOOKBACK_SECS;
        let old_end = entries.iter().rposition(|&(_, t)| t <= cutoff)?;
        if old_end + 1 < DECAY_WINDOW {
            return None;
        }

        let window_mean = |slice: &[(f32, f64)]| -> f32 {
            let finite: Vec<f32> = slice
                .iter()
                .map(|&(level, _)| level)
                .filter(|l| l.is_finite())
                .collect();
            if finite.is_empty() {
                f32::NEG_INFINITY
            } else {
                finite.iter().sum::<f32>() / finite.len() as f32
            }
        };

        let old_mean = window_mean(&entries[old_end + 1 - DECAY_WINDOW..=old_end]);
        let recent_mean = window_mean(&entries[entries.len() - DECAY_WINDOW..]);

        if old_mean > MIN_EXCITATION_DB && old_mean - recent_mean >= DECAY_TRIGGER_DB {
            Some((old_mean, entries[old_end].1))
        } else {
            None
        }
    }

    /// Forget history and any in-progress measurement.
    pub fn reset(&mut self) {
        self.history.clear();
        self.decaying = false;
        self.rt60_seconds = 0.0;
        self.valid = false;
    }
}

impl Default for Rt60Estimator {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    linear_to_db((sum_sq / samples.len() as f64).sqrt() as f32)
}

/// Standing-wave analysis band, Hz.
const MODE_BAND_LOW_HZ: f32 = 20.0;
const MODE_BAND_HIGH_HZ: f32 = 300.0;
/// Frames averaged per analysis window.
const MODE_WINDOW_FRAMES: usize = 30;
/// Excess over the band mean that marks a mode, dB.
const MODE_EXCESS_DB: f32 = 8.0;
/// Strongest modes reported.
const MAX_MODES: usize = 5;

/// One detected room mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomMode {
    /// Mode frequency, rounded Hz.
    pub frequency_hz: f32,
    /// Window-averaged level at the mode, dBFS.
    pub level_db: f32,
    /// Level above the band mean, dB.
    pub excess_db: f32,
}

/// Standing-wave candidates for one frame, strongest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingWaveResult {
    /// Up to five detected modes, sorted descending by level.
    pub modes: Vec<RoomMode>,
}

/// Rolling low-band averaging standing-wave detector.
#[derive(Debug, Clone)]
pub struct StandingWaveDetector {
    snapshots: VecDeque<Vec<f32>>,
}

impl StandingWaveDetector {
    /// Create a detector with no snapshots.
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::with_capacity(MODE_WINDOW_FRAMES),
        }
    }

    /// Accumulate one magnitude frame and report current modes.
    pub fn process(&mut self, magnitude_db: &[f32], sample_rate: u32) -> StandingWaveResult {
        if magnitude_db.is_empty() {
            return StandingWaveResult::default();
        }
        let fft_size = magnitude_db.len() * 2;
        let bin_width = sample_rate as f32 / fft_size as f32;
        let lo = ((MODE_BAND_LOW_HZ / bin_width).ceil() as usize).min(magnitude_db.len());
        let hi = ((MODE_BAND_HIGH_HZ / bin_width).floor() as usize + 1).min(magnitude_db.len());
        if lo >= hi {
            return StandingWaveResult::default();
        }

        if self.snapshots.len() == MODE_WINDOW_FRAMES {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(magnitude_db[lo..hi].to_vec());

        // Window-average each bin, then fold into rounded-Hz buckets
        let bins = hi - lo;
        let mut averaged = vec![0.0f32; bins];
        for snapshot in &self.snapshots {
            for (avg, &db) in averaged.iter_mut().zip(snapshot.iter()) {
                *avg += db;
            }
        }
        for avg in &mut averaged {
            *avg /= self.snapshots.len() as f32;
        }

        let mut buckets: BTreeMap<i64, (f32, u32)> = BTreeMap::new();
        for (i, &db) in averaged.iter().enumerate() {
            let hz = ((lo + i) as f32 * bin_width).round() as i64;
            let entry = buckets.entry(hz).or_insert((0.0, 0));
            entry.0 += db;
            entry.1 += 1;
        }

        let bucket_levels: Vec<(i64, f32)> = buckets
            .into_iter()
            .map(|(hz, (sum, count))| (hz, sum / count as f32))
            .collect();
        let band_mean =
            bucket_levels.iter().map(|&(_, db)| db).sum::<f32>() / bucket_levels.len() as f32;

        let mut modes: Vec<RoomMode> = bucket_levels
            .iter()
            .filter(|&&(_, db)| db - band_mean > MODE_EXCESS_DB)
            .map(|&(hz, db)| RoomMode {
                frequency_hz: hz as f32,
                level_db: db,
                excess_db: db - band_mean,
            })
            .collect();
        modes.sort_by(|a, b| {
            b.level_db
                .partial_cmp(&a.level_db)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        modes.truncate(MAX_MODES);

        StandingWaveResult { modes }
    }

    /// Drop the rolling window.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }
}

impl Default for StandingWaveDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48000;
    const BINS: usize = 2048;

    fn level_frame(amplitude: f32, n: usize) -> Vec<f32> {
        vec![amplitude; n]
    }

    /// Reference capture cadence: one frame per render tick.
    const FRAME_PERIOD: f64 = 1.0 / 60.0;

    #[test]
    fn test_decay_measured() {
        let mut estimator = Rt60Estimator::new();
        let mut t = 0.0;

        // Sustained excitation at ~-6 dBFS
        for _ in 0..40 {
            estimator.process(&level_frame(0.5, 256), t);
            t += FRAME_PERIOD;
        }
        // Sharp drop to -40 dBFS: decay begins once the recent window falls
        let mut decaying_seen = false;
        for _ in 0..12 {
            let result = estimator.process(&level_frame(0.01, 256), t);
            decaying_seen |= result.decaying;
            t += FRAME_PERIOD;
        }
        assert!(decaying_seen, "decay onset not detected");

        // Floor below start-60 dB finishes the measurement; run long enough
        // that the lookback window also leaves the loud region
        let mut result = Rt60Result {
            rt60_seconds: 0.0,
            decaying: false,
            valid: false,
        };
        for _ in 0..40 {
            result = estimator.process(&level_frame(0.0002, 256), t);
            t += FRAME_PERIOD;
        }
        assert!(result.valid);
        assert!(!result.decaying);
        assert!(
            result.rt60_seconds > 0.0 && result.rt60_seconds < 5.0,
            "RT60 {}",
            result.rt60_seconds
        );
    }

    #[test]
    fn test_quiet_material_never_triggers() {
        let mut estimator = Rt60Estimator::new();
        let mut t = 0.0;
        // Excitation below -20 dBFS, then silence
        for _ in 0..40 {
            estimator.process(&level_frame(0.05, 256), t);
            t += FRAME_PERIOD;
        }
        for _ in 0..40 {
            let result = estimator.process(&level_frame(0.0, 256), t);
            assert!(!result.decaying);
            assert!(!result.valid);
            t += FRAME_PERIOD;
        }
    }

    #[test]
    fn test_rebound_cancels_measurement() {
        let mut estimator = Rt60Estimator::new();
        let mut t = 0.0;
        for _ in 0..40 {
            estimator.process(&level_frame(0.5, 256), t);
            t += FRAME_PERIOD;
        }
        let mut decaying_seen = false;
        for _ in 0..12 {
            decaying_seen |= estimator.process(&level_frame(0.01, 256), t).decaying;
            t += FRAME_PERIOD;
        }
        assert!(decaying_seen);
        // Excitation returns: measurement abandoned
        let result = estimator.process(&level_frame(0.5, 256), t);
        assert!(!result.decaying);
        assert!(!result.valid);
    }

    #[test]
    fn test_standing_wave_found() {
        let mut detector = StandingWaveDetector::new();
        let bin_width = SAMPLE_RATE as f32 / (BINS * 2) as f32;
        let mode_bin = (100.0 / bin_width).round() as usize;

        let mut spectrum = vec![-60.0f32; BINS];
        spectrum[mode_bin] = -30.0;

        let mut result = StandingWaveResult::default();
        for _ in 0..MODE_WINDOW_FRAMES {
            result = detector.process(&spectrum, SAMPLE_RATE);
        }
        assert!(!result.modes.is_empty());
        let top = &result.modes[0];
        assert!(
            (top.frequency_hz - 100.0).abs() < bin_width,
            "mode at {} Hz",
            top.frequency_hz
        );
        assert!(top.excess_db > MODE_EXCESS_DB);
    }

    #[test]
    fn test_flat_band_has_no_modes() {
        let mut detector = StandingWaveDetector::new();
        let spectrum = vec![-50.0f32; BINS];
        for _ in 0..MODE_WINDOW_FRAMES {
            let result = detector.process(&spectrum, SAMPLE_RATE);
            assert!(result.modes.is_empty());
        }
    }

    #[test]
    fn test_at_most_five_modes() {
        let mut detector = StandingWaveDetector::new();
        let bin_width = SAMPLE_RATE as f32 / (BINS * 2) as f32;
        let mut spectrum = vec![-70.0f32; BINS];
        // Ten elevated buckets spread across the band
        for k in 0..10usize {
            let bin = ((40.0 + 25.0 * k as f32) / bin_width).round() as usize;
            spectrum[bin] = -20.0;
        }
        let mut result = StandingWaveResult::default();
        for _ in 0..MODE_WINDOW_FRAMES {
            result = detector.process(&spectrum, SAMPLE_RATE);
        }
        assert_eq!(result.modes.len(), MAX_MODES);
        // Sorted descending by level
        for pair in result.modes.windows(2) {
            assert!(pair[0].level_db >= pair[1].level_db);
        }
    }
}
