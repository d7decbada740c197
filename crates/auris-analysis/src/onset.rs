//! Spectral-flux onset detection and tempo estimation.
//!
//! Flux is the positive-only frame-to-frame magnitude increase summed over
//! bins. An onset fires when flux exceeds 1.5× its 20-frame rolling mean
//! and the refractory gap (≈250 ms of frames) has elapsed. Onset timestamps
//! feed inter-onset-interval averaging; plausible intervals (200–2000 ms)
//! convert to BPM and smooth through an 8-slot ring, with confidence derived
//! from the smoothing ring's variance.

use auris_dsp::Ring;

/// Flux multiplier over the rolling mean required to fire.
const FLUX_THRESHOLD_RATIO: f32 = 1.5;
/// Rolling flux window, frames.
const FLUX_HISTORY: usize = 20;
/// Refractory gap between onsets, seconds.
const MIN_ONSET_GAP_SECS: f32 = 0.25;
/// Onset timestamps kept for interval averaging.
const ONSET_SLOTS: usize = 16;
/// Instantaneous-BPM smoothing slots.
const BPM_SLOTS: usize = 8;
/// Onsets required before tempo is reported.
const MIN_ONSETS_FOR_TEMPO: usize = 4;
/// Plausible beat interval, milliseconds.
const MIN_BEAT_MS: f32 = 200.0;
const MAX_BEAT_MS: f32 = 2000.0;

/// Onset/tempo state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetResult {
    /// Positive spectral flux of this frame, dB-sum.
    pub flux: f32,
    /// True when this frame fired an onset.
    pub is_onset: bool,
    /// Smoothed tempo, BPM. Zero until enough onsets accumulate.
    pub bpm: f32,
    /// Tempo confidence in \[0, 1\]. Zero until ≥4 onsets.
    pub bpm_confidence: f32,
}

/// Stateful onset detector and tempo tracker.
#[derive(Debug, Clone)]
pub struct OnsetDetector {
    prev_spectrum: Option<Vec<f32>>,
    flux_history: Ring<f32>,
    onset_times: Ring<f64>,
    bpm_history: Ring<f32>,
    min_gap_frames: u32,
    frames_since_onset: u32,
    onsets_seen: u64,
}

impl OnsetDetector {
    /// Create a detector; the refractory gap is derived from the frame
    /// cadence implied by `sample_rate / fft_size`.
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let frames_per_sec = sample_rate as f32 / fft_size as f32;
        let min_gap_frames = (MIN_ONSET_GAP_SECS * frames_per_sec).ceil().max(1.0) as u32;
        Self {
            prev_spectrum: None,
            flux_history: Ring::new(FLUX_HISTORY),
            onset_times: Ring::new(ONSET_SLOTS),
            bpm_history: Ring::new(BPM_SLOTS),
            min_gap_frames,
            frames_since_onset: u32::MAX,
            onsets_seen: 0,
        }
    }

    /// Examine one magnitude frame stamped with its capture time.
    pub fn process(&mut self, magnitude_db: &[f32], timestamp: f64) -> OnsetResult {
        let flux = match &self.prev_spectrum {
            Some(prev) if prev.len() == magnitude_db.len() => prev
                .iter()
                .zip(magnitude_db.iter())
                .map(|(&p, &c)| (c - p).max(0.0))
                .sum(),
            _ => 0.0,
        };

        let mean_flux = self.flux_history.mean();
        let gap_elapsed = self.frames_since_onset >= self.min_gap_frames;
        let is_onset = flux > FLUX_THRESHOLD_RATIO * mean_flux && flux > 0.0 && gap_elapsed;

        self.flux_history.push(flux);
        if let Some(prev) = &mut self.prev_spectrum {
            if prev.len() == magnitude_db.len() {
                prev.copy_from_slice(magnitude_db);
            } else {
                *prev = magnitude_db.to_vec();
            }
        } else {
            self.prev_spectrum = Some(magnitude_db.to_vec());
        }

        if is_onset {
            self.onset_times.push(timestamp);
            self.onsets_seen += 1;
            self.frames_since_onset = 0;
            self.update_tempo();
        } else {
            self.frames_since_onset = self.frames_since_onset.saturating_add(1);
        }

        let (bpm, bpm_confidence) = self.tempo();
        OnsetResult {
            flux,
            is_onset,
            bpm,
            bpm_confidence,
        }
    }

    /// Average the stored inter-onset intervals into an instantaneous BPM.
    fn update_tempo(&mut self) {
        if self.onset_times.len() < MIN_ONSETS_FOR_TEMPO {
            return;
        }
        let times: Vec<f64> = self.onset_times.iter().collect();
        let mut interval_sum = 0.0f64;
        for pair in times.windows(2) {
            interval_sum += pair[1] - pair[0];
        }
        let mean_interval_ms = (interval_sum / (times.len() - 1) as f64 * 1000.0) as f32;
        if (MIN_BEAT_MS..=MAX_BEAT_MS).contains(&mean_interval_ms) {
            self.bpm_history.push(60000.0 / mean_interval_ms);
        }
    }

    fn tempo(&self) -> (f32, f32) {
        if self.onsets_seen < MIN_ONSETS_FOR_TEMPO as u64 || self.bpm_history.is_empty() {
            return (0.0, 0.0);
        }
        let bpm = self.bpm_history.mean();
        let confidence = (1.0 / (1.0 + self.bpm_history.variance())).clamp(0.0, 1.0);
        (bpm, confidence)
    }

    /// Forget all flux, onset and tempo history.
    pub fn reset(&mut self) {
        self.prev_spectrum = None;
        self.flux_history.clear();
        self.onset_times.clear();
        self.bpm_history.clear();
        self.frames_since_onset = u32::MAX;
        self.onsets_seen = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 2048;

    fn quiet() -> Vec<f32> {
        vec![-100.0f32; BINS]
    }

    fn burst() -> Vec<f32> {
        vec![-10.0f32; BINS]
    }

    /// Drive a click train with the given inter-click spacing.
    fn run_clicks(
        detector: &mut OnsetDetector,
        clicks: usize,
        spacing_secs: f64,
        frame_period: f64,
    ) -> OnsetResult {
        let mut result = detector.process(&quiet(), 0.0);
        let frames_per_click = (spacing_secs / frame_period).round() as usize;
        let total = clicks * frames_per_click + 1;
        for k in 1..total {
            let t = k as f64 * frame_period;
            let spectrum = if k % frames_per_click == 0 {
                burst()
            } else {
                quiet()
            };
            result = detector.process(&spectrum, t);
        }
        result
    }

    #[test]
    fn test_flux_is_positive_only() {
        let mut detector = OnsetDetector::new(48000, 4096);
        detector.process(&burst(), 0.0);
        // Falling spectrum contributes no flux
        let result = detector.process(&quiet(), 0.1);
        assert_eq!(result.flux, 0.0);
        let result = detector.process(&burst(), 0.2);
        assert!(result.flux > 0.0);
    }

    #[test]
    fn test_silence_never_fires() {
        let mut detector = OnsetDetector::new(48000, 4096);
        for k in 0..100 {
            let result = detector.process(&quiet(), k as f64 * 0.1);
            assert!(!result.is_onset);
        }
    }

    #[test]
    fn test_refractory_gap_suppresses_double_fire() {
        let mut detector = OnsetDetector::new(48000, 4096);
        // ~11.7 frames/sec at 48k/4096: gap is 3 frames
        detector.process(&quiet(), 0.0);
        let first = detector.process(&burst(), 0.085);
        assert!(first.is_onset);
        let hold = detector.process(&burst(), 0.171);
        assert!(!hold.is_onset);
    }

    #[test]
    fn test_click_train_converges_to_120_bpm() {
        let mut detector = OnsetDetector::new(48000, 4096);
        // 500 ms clicks on a 100 ms frame grid
        let result = run_clicks(&mut detector, 8, 0.5, 0.1);
        assert!(
            (result.bpm - 120.0).abs() < 2.0,
            "BPM {} after click train",
            result.bpm
        );
        assert!(result.bpm_confidence > 0.5, "confidence {}", result.bpm_confidence);
    }

    #[test]
    fn test_no_tempo_before_four_onsets() {
        let mut detector = OnsetDetector::new(48000, 4096);
        let result = run_clicks(&mut detector, 3, 0.5, 0.1);
        assert_eq!(result.bpm, 0.0);
        assert_eq!(result.bpm_confidence, 0.0);
    }

    #[test]
    fn test_implausible_intervals_rejected() {
        let mut detector = OnsetDetector::new(48000, 4096);
        // 4-second spacing is outside the 200-2000 ms beat range
        let result = run_clicks(&mut detector, 6, 4.0, 0.1);
        assert_eq!(result.bpm, 0.0);
    }

    #[test]
    fn test_reset_clears_tempo() {
        let mut detector = OnsetDetector::new(48000, 4096);
        let result = run_clicks(&mut detector, 8, 0.5, 0.1);
        assert!(result.bpm > 0.0);
        detector.reset();
        let result = detector.process(&quiet(), 100.0);
        assert_eq!(result.bpm, 0.0);
        assert!(!result.is_onset);
    }
}
