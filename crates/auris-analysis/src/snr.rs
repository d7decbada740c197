//! Signal-to-noise estimation with a calibration phase.
//!
//! The first 30 frames of a session are assumed to be room tone: their mean
//! spectral power establishes the noise floor. Every later frame's power is
//! compared against it; the ratio is floored at unity so the reading never
//! goes negative.

use auris_dsp::{db_to_power, power_to_db};

/// Frames averaged to establish the noise floor (≈1 s at reference cadence).
const CALIBRATION_FRAMES: u32 = 30;

/// SNR state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnrResult {
    /// Signal-to-noise ratio, dB. Zero while calibrating and never negative.
    pub snr_db: f32,
    /// True while the noise floor is still being measured.
    pub calibrating: bool,
    /// The established noise floor, dBFS. −∞ until calibration completes.
    pub noise_floor_db: f32,
}

/// Stateful SNR estimator.
#[derive(Debug, Clone)]
pub struct SnrEstimator {
    frames_seen: u32,
    noise_accum: f64,
    noise_power: f32,
}

impl SnrEstimator {
    /// Create an estimator at the start of its calibration phase.
    pub fn new() -> Self {
        Self {
            frames_seen: 0,
            noise_accum: 0.0,
            noise_power: 0.0,
        }
    }

    /// Feed one magnitude frame.
    pub fn process(&mut self, magnitude_db: &[f32]) -> SnrResult {
        let frame_power = mean_power(magnitude_db);

        if self.frames_seen < CALIBRATION_FRAMES {
            self.frames_seen += 1;
            self.noise_accum += f64::from(frame_power);
            if self.frames_seen == CALIBRATION_FRAMES {
                self.noise_power = (self.noise_accum / f64::from(CALIBRATION_FRAMES)) as f32;
            }
            return SnrResult {
                snr_db: 0.0,
                calibrating: self.frames_seen < CALIBRATION_FRAMES,
                noise_floor_db: if self.frames_seen == CALIBRATION_FRAMES {
                    power_to_db(self.noise_power)
                } else {
                    f32::NEG_INFINITY
                },
            };
        }

        let snr_db = if self.noise_power > 0.0 {
            power_to_db((frame_power / self.noise_power).max(1.0))
        } else {
            // Perfectly silent calibration: any signal is infinite SNR,
            // report the raw signal level above the digital floor instead
            power_to_db(f64::from(frame_power).max(1.0) as f32)
        };

        SnrResult {
            snr_db,
            calibrating: false,
            noise_floor_db: power_to_db(self.noise_power),
        }
    }

    /// Restart calibration from scratch.
    pub fn reset(&mut self) {
        self.frames_seen = 0;
        self.noise_accum = 0.0;
        self.noise_power = 0.0;
    }
}

impl Default for SnrEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean linear power across bins.
fn mean_power(magnitude_db: &[f32]) -> f32 {
    if magnitude_db.is_empty() {
        return 0.0;
    }
    let sum: f64 = magnitude_db
        .iter()
        .map(|&db| f64::from(db_to_power(db)))
        .sum();
    (sum / magnitude_db.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINS: usize = 2048;

    #[test]
    fn test_calibration_phase_length() {
        let mut estimator = SnrEstimator::new();
        let noise = vec![-60.0f32; BINS];
        for k in 0..CALIBRATION_FRAMES {
            let result = estimator.process(&noise);
            assert_eq!(result.snr_db, 0.0);
            let expect_calibrating = k + 1 < CALIBRATION_FRAMES;
            assert_eq!(result.calibrating, expect_calibrating, "frame {}", k);
        }
        let result = estimator.process(&noise);
        assert!(!result.calibrating);
    }

    #[test]
    fn test_forty_db_snr() {
        let mut estimator = SnrEstimator::new();
        let noise = vec![-60.0f32; BINS];
        for _ in 0..CALIBRATION_FRAMES {
            estimator.process(&noise);
        }
        let signal = vec![-20.0f32; BINS];
        let result = estimator.process(&signal);
        assert!(
            (result.snr_db - 40.0).abs() < 0.5,
            "SNR {} dB",
            result.snr_db
        );
        assert!((result.noise_floor_db - (-60.0)).abs() < 0.5);
    }

    #[test]
    fn test_snr_never_negative() {
        let mut estimator = SnrEstimator::new();
        let noise = vec![-40.0f32; BINS];
        for _ in 0..CALIBRATION_FRAMES {
            estimator.process(&noise);
        }
        // Signal quieter than the calibrated floor
        let result = estimator.process(&vec![-80.0f32; BINS]);
        assert_eq!(result.snr_db, 0.0);
    }

    #[test]
    fn test_reset_recalibrates() {
        let mut estimator = SnrEstimator::new();
        for _ in 0..CALIBRATION_FRAMES + 5 {
            estimator.process(&vec![-60.0f32; BINS]);
        }
        estimator.reset();
        let result = estimator.process(&vec![-60.0f32; BINS]);
        assert!(result.calibrating);
        assert_eq!(result.snr_db, 0.0);
    }
}
