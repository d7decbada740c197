//! Feedback and ringing detection with notch suggestion.
//!
//! A narrow spectral peak that stands far above the frame mean and stays put
//! across consecutive frames is the signature of acoustic feedback building
//! up. The detector tracks the strongest qualifying peak; once it persists
//! long enough the frame is flagged and a corrective notch (frequency, Q,
//! cut depth) is suggested. A hold keeps the flag visible for meters after
//! the ringing stops.

/// Analysis band, Hz. Feedback below/above this is rare and bin-sparse.
const BAND_LOW_HZ: f32 = 80.0;
const BAND_HIGH_HZ: f32 = 8000.0;
/// Prominence over the band mean required to qualify, dB.
const PROMINENCE_DB: f32 = 20.0;
/// Consecutive frames a peak must persist before it is flagged.
const PERSISTENCE_FRAMES: u32 = 12;
/// Candidate may drift this many bins between frames and still match.
const BIN_TOLERANCE: usize = 1;
/// Frames the risk flag stays lit after the ringing stops.
const HOLD_FRAMES: u32 = 60;
/// Safety margin added to the suggested cut, dB.
const CUT_MARGIN_DB: f32 = 6.0;
/// Deepest cut ever suggested, dB.
const MAX_CUT_DB: f32 = 24.0;

/// Feedback assessment for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackResult {
    /// True while a ringing peak persists or its hold is active.
    pub risk: bool,
    /// True only on the frame where persistence first crosses the
    /// threshold.
    pub new_event: bool,
    /// Suggested notch center, Hz. Zero when no risk.
    pub frequency_hz: f32,
    /// Suggested notch Q.
    pub q: f32,
    /// Suggested cut depth, dB (positive number of dB to remove).
    pub cut_db: f32,
    /// Frames the current candidate has persisted.
    pub persistence: u32,
}

impl FeedbackResult {
    fn clear() -> Self {
        Self {
            risk: false,
            new_event: false,
            frequency_hz: 0.0,
            q: 0.0,
            cut_db: 0.0,
            persistence: 0,
        }
    }
}

/// Stateful narrow-band ringing detector.
#[derive(Debug, Clone)]
pub struct FeedbackDetector {
    candidate_bin: Option<usize>,
    persistence: u32,
    hold_frames: u32,
    suggestion: (f32, f32, f32),
}

impl FeedbackDetector {
    /// Create a detector with no candidate.
    pub fn new() -> Self {
        Self {
            candidate_bin: None,
            persistence: 0,
            hold_frames: 0,
            suggestion: (0.0, 0.0, 0.0),
        }
    }

    /// Examine one magnitude frame.
    pub fn process(&mut self, magnitude_db: &[f32], sample_rate: u32) -> FeedbackResult {
        let Some((bin, prominence)) = self.find_peak(magnitude_db, sample_rate) else {
            self.candidate_bin = None;
            self.persistence = 0;
            self.hold_frames = self.hold_frames.saturating_sub(1);
            return self.held_result();
        };

        let matches = self
            .candidate_bin
            .is_some_and(|prev| bin.abs_diff(prev) <= BIN_TOLERANCE);
        self.persistence = if matches { self.persistence + 1 } else { 1 };
        self.candidate_bin = Some(bin);

        if self.persistence < PERSISTENCE_FRAMES {
            self.hold_frames = self.hold_frames.saturating_sub(1);
            let mut result = self.held_result();
            result.persistence = self.persistence;
            return result;
        }

        // Ringing confirmed: refresh the hold and the notch suggestion
        let new_event = self.hold_frames == 0;
        self.hold_frames = HOLD_FRAMES;
        self.suggestion = notch_suggestion(magnitude_db, sample_rate, bin, prominence);

        FeedbackResult {
            risk: true,
            new_event,
            frequency_hz: self.suggestion.0,
            q: self.suggestion.1,
            cut_db: self.suggestion.2,
            persistence: self.persistence,
        }
    }

    /// Strongest local maximum exceeding the band mean by the prominence
    /// threshold. Returns `(bin, prominence_db)`.
    fn find_peak(&self, magnitude_db: &[f32], sample_rate: u32) -> Option<(usize, f32)> {
        if magnitude_db.len() < 3 {
            return None;
        }
        let fft_size = magnitude_db.len() * 2;
        let bin_width = sample_rate as f32 / fft_size as f32;
        let lo = ((BAND_LOW_HZ / bin_width).ceil() as usize).max(1);
        let hi = ((BAND_HIGH_HZ / bin_width).floor() as usize).min(magnitude_db.len() - 2);
        if lo >= hi {
            return None;
        }

        let band = &magnitude_db[lo..=hi];
        let band_mean = band.iter().sum::<f32>() / band.len() as f32;

        let mut best: Option<(usize, f32)> = None;
        for bin in lo..=hi {
            let level = magnitude_db[bin];
            if level <= magnitude_db[bin - 1] || level <= magnitude_db[bin + 1] {
                continue;
            }
            let prominence = level - band_mean;
            if prominence < PROMINENCE_DB {
                continue;
            }
            if best.is_none_or(|(b, _)| level > magnitude_db[b]) {
                best = Some((bin, prominence));
            }
        }
        best
    }

    fn held_result(&self) -> FeedbackResult {
        if self.hold_frames > 0 {
            FeedbackResult {
                risk: true,
                new_event: false,
                frequency_hz: self.suggestion.0,
                q: self.suggestion.1,
                cut_db: self.suggestion.2,
                persistence: self.persistence,
            }
        } else {
            FeedbackResult::clear()
        }
    }

    /// Drop the candidate, hold and suggestion.
    pub fn reset(&mut self) {
        self.candidate_bin = None;
        self.persistence = 0;
        self.hold_frames = 0;
        self.suggestion = (0.0, 0.0, 0.0);
    }
}

impl Default for FeedbackDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive notch parameters from the peak's shape.
fn notch_suggestion(
    magnitude_db: &[f32],
    sample_rate: u32,
    bin: usize,
    prominence: f32,
) -> (f32, f32, f32) {
    let fft_size = magnitude_db.len() * 2;
    let bin_width = sample_rate as f32 / fft_size as f32;

    // Sub-bin peak frequency via parabolic interpolation
    let refined = if bin > 0 && bin + 1 < magnitude_db.len() {
        let left = magnitude_db[bin - 1];
        let mid = magnitude_db[bin];
        let right = magnitude_db[bin + 1];
        let denom = left - 2.0 * mid + right;
        if denom.abs() > 1e-9 {
            bin as f32 + (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
        } else {
            bin as f32
        }
    } else {
        bin as f32
    };
    let frequency_hz = refined * bin_width;

    // Bandwidth at 3 dB below the peak
    let half_level = magnitude_db[bin] - 3.0;
    let mut left_bin = bin;
    while left_bin > 0 && magnitude_db[left_bin - 1] > half_level {
        left_bin -= 1;
    }
    let mut right_bin = bin;
    while right_bin + 1 < magnitude_db.len() && magnitude_db[right_bin + 1] > half_level {
        right_bin += 1;
    }
    let bandwidth_hz = ((right_bin - left_bin + 1) as f32 * bin_width).max(bin_width);
    let q = (frequency_hz / bandwidth_hz).clamp(1.0, 100.0);

    let cut_db = (prominence + CUT_MARGIN_DB).min(MAX_CUT_DB);
    (frequency_hz, q, cut_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 2048;
    const SAMPLE_RATE: u32 = 48000;

    fn ringing_spectrum(bin: usize) -> Vec<f32> {
        let mut spectrum = vec![-70.0f32; BINS];
        spectrum[bin - 1] = -40.0;
        spectrum[bin] = -20.0;
        spectrum[bin + 1] = -40.0;
        spectrum
    }

    #[test]
    fn test_persistent_peak_flags_risk() {
        let mut detector = FeedbackDetector::new();
        let spectrum = ringing_spectrum(200);

        let mut events = 0;
        let mut last = FeedbackResult::clear();
        for _ in 0..PERSISTENCE_FRAMES {
            last = detector.process(&spectrum, SAMPLE_RATE);
            if last.new_event {
                events += 1;
            }
        }
        assert!(last.risk);
        assert_eq!(events, 1, "event fires exactly once");
        let expected = 200.0 * 48000.0 / 4096.0;
        assert!(
            (last.frequency_hz - expected).abs() < 12.0,
            "suggested {} Hz",
            last.frequency_hz
        );
        assert!(last.q > 1.0);
        assert!(last.cut_db > 0.0 && last.cut_db <= MAX_CUT_DB);
    }

    #[test]
    fn test_brief_peak_does_not_flag() {
        let mut detector = FeedbackDetector::new();
        let spectrum = ringing_spectrum(300);
        let flat = vec![-70.0f32; BINS];
        for _ in 0..6 {
            assert!(!detector.process(&spectrum, SAMPLE_RATE).risk);
        }
        let result = detector.process(&flat, SAMPLE_RATE);
        assert!(!result.risk);
        assert_eq!(result.persistence, 0);
    }

    #[test]
    fn test_hold_keeps_flag_after_ringing_stops() {
        let mut detector = FeedbackDetector::new();
        let spectrum = ringing_spectrum(150);
        let flat = vec![-70.0f32; BINS];
        for _ in 0..PERSISTENCE_FRAMES {
            detector.process(&spectrum, SAMPLE_RATE);
        }
        let held = detector.process(&flat, SAMPLE_RATE);
        assert!(held.risk);
        assert!(!held.new_event);
        // Hold decays to clear
        let mut result = held;
        for _ in 0..HOLD_FRAMES {
            result = detector.process(&flat, SAMPLE_RATE);
        }
        assert!(!result.risk);
    }

    #[test]
    fn test_wandering_peak_resets_persistence() {
        let mut detector = FeedbackDetector::new();
        for i in 0..40usize {
            // Peak jumps 50 bins every frame: never feedback
            let result = detector.process(&ringing_spectrum(200 + 50 * (i % 8)), SAMPLE_RATE);
            assert!(!result.risk, "flagged at frame {}", i);
        }
    }

    #[test]
    fn test_quiet_spectrum_is_clear() {
        let mut detector = FeedbackDetector::new();
        let result = detector.process(&vec![-100.0f32; BINS], SAMPLE_RATE);
        assert!(!result.risk);
        assert_eq!(result.frequency_hz, 0.0);
    }
}
