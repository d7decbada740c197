//! IEC 61672 A-weighting curve.
//!
//! The analytic curve is normalized so 1 kHz maps to 0 dB correction. A
//! cached per-bin table ([`AWeightingTable`]) is built once for a
//! sample-rate/FFT-size pair and applied per frame; below 10 Hz the curve is
//! clamped to a floor constant because the analytic form diverges toward
//! −∞ and intermediate terms lose precision.

use alloc::{vec, vec::Vec};
use libm::{log10f, sqrtf};

/// Correction floor applied below 10 Hz.
const LOW_FREQ_FLOOR_DB: f32 = -200.0;

fn response(freq_hz: f32) -> f32 {
    let f2 = freq_hz * freq_hz;
    let num = 12194.0f32 * 12194.0 * f2 * f2;
    let den = (f2 + 20.6 * 20.6)
        * sqrtf((f2 + 107.7 * 107.7) * (f2 + 737.9 * 737.9))
        * (f2 + 12194.0 * 12194.0);
    num / den
}

/// A-weighting correction in dB for a frequency, normalized to 0 dB at 1 kHz.
///
/// Frequencies below 10 Hz return a fixed floor.
pub fn a_weighting_db(freq_hz: f32) -> f32 {
    if freq_hz < 10.0 {
        return LOW_FREQ_FLOOR_DB;
    }
    20.0 * log10f(response(freq_hz) / response(1000.0))
}

/// Precomputed per-bin A-weighting corrections for one sample-rate/FFT-size
/// pair.
#[derive(Debug, Clone)]
pub struct AWeightingTable {
    gains_db: Vec<f32>,
}

impl AWeightingTable {
    /// Build the table for `fft_size / 2` bins.
    ///
    /// Bin `i` covers frequency `i · sample_rate / fft_size`.
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let bins = fft_size / 2;
        let bin_width = sample_rate as f32 / fft_size as f32;
        let mut gains_db = vec![0.0f32; bins];
        for (i, gain) in gains_db.iter_mut().enumerate() {
            *gain = a_weighting_db(i as f32 * bin_width);
        }
        Self { gains_db }
    }

    /// Correction for one bin, in dB.
    pub fn get(&self, bin: usize) -> f32 {
        self.gains_db.get(bin).copied().unwrap_or(LOW_FREQ_FLOOR_DB)
    }

    /// Number of bins in the table.
    pub fn len(&self) -> usize {
        self.gains_db.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.gains_db.is_empty()
    }

    /// Add the per-bin corrections to a dB magnitude spectrum in place.
    ///
    /// `magnitude_db` must have the same bin layout the table was built for.
    pub fn apply(&self, magnitude_db: &mut [f32]) {
        for (m, &g) in magnitude_db.iter_mut().zip(self.gains_db.iter()) {
            *m += g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frequency_is_zero() {
        assert!(a_weighting_db(1000.0).abs() < 1e-4);
    }

    #[test]
    fn test_known_curve_points() {
        // IEC 61672 table values
        assert!((a_weighting_db(100.0) - (-19.1)).abs() < 0.5);
        assert!((a_weighting_db(20.0) - (-50.5)).abs() < 1.0);
        assert!((a_weighting_db(10000.0) - (-2.5)).abs() < 0.5);
    }

    #[test]
    fn test_infrasound_clamps_to_floor() {
        assert_eq!(a_weighting_db(5.0), LOW_FREQ_FLOOR_DB);
        assert_eq!(a_weighting_db(0.0), LOW_FREQ_FLOOR_DB);
        assert!(a_weighting_db(5.0).is_finite());
    }

    #[test]
    fn test_table_matches_analytic_curve() {
        let table = AWeightingTable::new(48000, 4096);
        assert_eq!(table.len(), 2048);
        let bin_width = 48000.0_f32 / 4096.0;
        let bin = (1000.0 / bin_width).round() as usize;
        assert!((table.get(bin) - a_weighting_db(bin as f32 * bin_width)).abs() < 1e-6);
    }

    #[test]
    fn test_apply_adds_correction() {
        let table = AWeightingTable::new(48000, 256);
        let mut spectrum = vec![-40.0f32; 128];
        table.apply(&mut spectrum);
        let bin_width = 48000.0_f32 / 256.0;
        let bin_1k = (1000.0 / bin_width).round() as usize;
        // Near 1 kHz the correction is small
        assert!((spectrum[bin_1k] + 40.0).abs() < 1.0);
        // DC bin takes the floor
        assert_eq!(spectrum[0], -40.0 + LOW_FREQ_FLOOR_DB);
    }
}
