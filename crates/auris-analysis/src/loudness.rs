//! BS.1770-style loudness metering: momentary, short-term, integrated, LRA.
//!
//! Each frame is K-weighted sample-by-sample through a high-shelf/high-pass
//! biquad pair, and its mean-square energy becomes one gating block.
//! Momentary loudness averages the last 4 blocks, short-term the last 30.
//! Integrated loudness applies the two-stage gate (absolute −70 LUFS, then
//! relative −10 LU against the ungated mean); loudness range is the 10th to
//! 95th percentile spread of gated short-term values.
//!
//! Until a qualifying block exists, integrated loudness reads −∞. All
//! outputs are finite or −∞, never NaN.

use auris_dsp::{Biquad, high_shelf_coefficients, highpass_coefficients, percentile, power_to_db};

/// K-weighting shelf stage: +4 dB high shelf at ~1682 Hz.
const SHELF_FREQ_HZ: f32 = 1681.97;
const SHELF_GAIN_DB: f32 = 4.0;
const SHELF_Q: f32 = 0.7072;

/// K-weighting high-pass stage at ~38.1 Hz.
const HIGHPASS_FREQ_HZ: f32 = 38.135;
const HIGHPASS_Q: f32 = 0.5003;

/// BS.1770 LUFS offset.
const LUFS_OFFSET: f32 = -0.691;
/// Absolute gate, LUFS.
const ABSOLUTE_GATE_LUFS: f32 = -70.0;
/// Relative gate below the ungated mean, LU.
const RELATIVE_GATE_LU: f32 = 10.0;
/// Blocks in the momentary window (≈400 ms at block granularity).
const MOMENTARY_BLOCKS: usize = 4;
/// Blocks in the short-term window (≈3 s).
const SHORT_TERM_BLOCKS: usize = 30;

/// Loudness readings for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessResult {
    /// Momentary loudness, LUFS. −∞ for silence.
    pub momentary_lufs: f32,
    /// Short-term loudness, LUFS.
    pub short_term_lufs: f32,
    /// Gated integrated loudness, LUFS. −∞ until a block passes the gate.
    pub integrated_lufs: f32,
    /// Loudness range, LU.
    pub range_lu: f32,
}

/// Stateful LUFS meter.
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    shelf: Biquad,
    highpass: Biquad,
    /// Mean-square energy of every block this session, for gating.
    block_energies: Vec<f32>,
    /// Short-term loudness per block above the absolute gate, for LRA.
    short_term_history: Vec<f32>,
}

impl LoudnessMeter {
    /// Create a meter for the given sample rate.
    pub fn new(sample_rate: u32) -> Self {
        let sr = sample_rate as f32;
        Self {
            shelf: Biquad::from_coefficients(high_shelf_coefficients(
                SHELF_FREQ_HZ,
                SHELF_GAIN_DB,
                SHELF_Q,
                sr,
            )),
            highpass: Biquad::from_coefficients(highpass_coefficients(
                HIGHPASS_FREQ_HZ,
                HIGHPASS_Q,
                sr,
            )),
            block_energies: Vec::new(),
            short_term_history: Vec::new(),
        }
    }

    /// Meter one sample frame as one gating block.
    pub fn process(&mut self, samples: &[f32]) -> LoudnessResult {
        let mut sum_sq = 0.0f64;
        for &s in samples {
            let weighted = self.highpass.process(self.shelf.process(s));
            sum_sq += f64::from(weighted) * f64::from(weighted);
        }
        let energy = if samples.is_empty() {
            0.0
        } else {
            (sum_sq / samples.len() as f64) as f32
        };
        self.block_energies.push(energy);

        let momentary_lufs = lufs(mean_of_last(&self.block_energies, MOMENTARY_BLOCKS));
        let short_term_lufs = lufs(mean_of_last(&self.block_energies, SHORT_TERM_BLOCKS));
        if short_term_lufs > ABSOLUTE_GATE_LUFS {
            self.short_term_history.push(short_term_lufs);
        }

        LoudnessResult {
            momentary_lufs,
            short_term_lufs,
            integrated_lufs: self.integrated(),
            range_lu: self.range(),
        }
    }

    /// Two-stage gated integrated loudness over the session so far.
    fn integrated(&self) -> f32 {
        // Stage one: absolute gate
        let absolute: Vec<f32> = self
            .block_energies
            .iter()
            .copied()
            .filter(|&e| lufs(e) > ABSOLUTE_GATE_LUFS)
            .collect();
        if absolute.is_empty() {
            return f32::NEG_INFINITY;
        }

        let ungated = lufs(mean(&absolute));
        let relative_gate = ungated - RELATIVE_GATE_LU;

        // Stage two: relative gate
        let gated: Vec<f32> = absolute
            .iter()
            .copied()
            .filter(|&e| lufs(e) > relative_gate)
            .collect();
        if gated.is_empty() {
            return f32::NEG_INFINITY;
        }
        lufs(mean(&gated))
    }

    /// 10th–95th percentile spread of gated short-term loudness.
    fn range(&self) -> f32 {
        if self.short_term_history.len() < 2 {
            return 0.0;
        }
        let mut sorted = self.short_term_history.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        (percentile(&sorted, 95.0) - percentile(&sorted, 10.0)).max(0.0)
    }

    /// Forget the session: gating blocks, LRA history and filter state.
    pub fn reset(&mut self) {
        self.block_energies.clear();
        self.short_term_history.clear();
        self.shelf.clear();
        self.highpass.clear();
    }
}

/// `-0.691 + 10·log10(mean square)`; zero energy maps to −∞.
fn lufs(mean_square: f32) -> f32 {
    let db = power_to_db(mean_square);
    if db == f32::NEG_INFINITY {
        f32::NEG_INFINITY
    } else {
        LUFS_OFFSET + db
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn mean_of_last(values: &[f32], n: usize) -> f32 {
    let take = n.min(values.len());
    if take == 0 {
        return 0.0;
    }
    values[values.len() - take..].iter().sum::<f32>() / take as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 48000;
    const FRAME: usize = 4096;

    fn sine_frame(freq: f32, amplitude: f32, offset: usize) -> Vec<f32> {
        (0..FRAME)
            .map(|i| {
                amplitude * (2.0 * PI * freq * (offset + i) as f32 / SAMPLE_RATE as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_silence_reads_neg_infinity() {
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        let mut result = meter.process(&vec![0.0; FRAME]);
        for _ in 0..40 {
            result = meter.process(&vec![0.0; FRAME]);
        }
        assert_eq!(result.momentary_lufs, f32::NEG_INFINITY);
        assert_eq!(result.short_term_lufs, f32::NEG_INFINITY);
        assert_eq!(result.integrated_lufs, f32::NEG_INFINITY);
        assert_eq!(result.range_lu, 0.0);
    }

    #[test]
    fn test_full_scale_sine_near_reference() {
        // ITU reference: a 0 dBFS 997 Hz sine reads ~-3.01 LUFS
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        let mut result = meter.process(&sine_frame(997.0, 1.0, 0));
        for k in 1..40 {
            result = meter.process(&sine_frame(997.0, 1.0, k * FRAME));
        }
        assert!(
            (result.momentary_lufs - (-3.01)).abs() < 0.5,
            "momentary {}",
            result.momentary_lufs
        );
        assert!(
            (result.integrated_lufs - (-3.01)).abs() < 0.5,
            "integrated {}",
            result.integrated_lufs
        );
    }

    #[test]
    fn test_level_change_reflected_in_momentary() {
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        for k in 0..30 {
            meter.process(&sine_frame(440.0, 1.0, k * FRAME));
        }
        let loud = meter.process(&sine_frame(440.0, 1.0, 30 * FRAME));
        for k in 31..61 {
            meter.process(&sine_frame(440.0, 0.1, k * FRAME));
        }
        let quiet = meter.process(&sine_frame(440.0, 0.1, 61 * FRAME));
        // 20 dB amplitude drop
        assert!(
            (loud.momentary_lufs - quiet.momentary_lufs - 20.0).abs() < 1.0,
            "{} vs {}",
            loud.momentary_lufs,
            quiet.momentary_lufs
        );
    }

    #[test]
    fn test_gate_excludes_silence_from_integrated() {
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        for k in 0..20 {
            meter.process(&sine_frame(440.0, 0.5, k * FRAME));
        }
        let with_signal = meter.process(&sine_frame(440.0, 0.5, 20 * FRAME)).integrated_lufs;
        // A long silent tail must not drag the integrated value down
        let mut after_silence = with_signal;
        for _ in 0..100 {
            after_silence = meter.process(&vec![0.0; FRAME]).integrated_lufs;
        }
        assert!(
            (with_signal - after_silence).abs() < 0.5,
            "{} vs {}",
            with_signal,
            after_silence
        );
    }

    #[test]
    fn test_loudness_never_nan() {
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        let frames: [Vec<f32>; 3] = [
            vec![0.0; FRAME],
            sine_frame(100.0, 1.0, 0),
            vec![0.0; FRAME],
        ];
        for frame in frames.iter().cycle().take(90) {
            let result = meter.process(frame);
            assert!(!result.momentary_lufs.is_nan());
            assert!(!result.short_term_lufs.is_nan());
            assert!(!result.integrated_lufs.is_nan());
            assert!(!result.range_lu.is_nan());
        }
    }

    #[test]
    fn test_reset_restarts_session() {
        let mut meter = LoudnessMeter::new(SAMPLE_RATE);
        for k in 0..10 {
            meter.process(&sine_frame(440.0, 1.0, k * FRAME));
        }
        meter.reset();
        let result = meter.process(&vec![0.0; FRAME]);
        assert_eq!(result.integrated_lufs, f32::NEG_INFINITY);
        assert_eq!(result.range_lu, 0.0);
    }
}
