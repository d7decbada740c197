//! Spectral shape statistics: centroid, flatness, rolloff, bandwidth.
//!
//! All statistics weight bins by linear power recovered from the dBFS
//! magnitudes. A spectrum with no energy yields all-zero statistics rather
//! than dividing by zero.

use auris_dsp::db_to_power;

/// Per-frame spectral shape statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralStats {
    /// Power-weighted center of mass, Hz.
    pub centroid_hz: f32,
    /// Geometric/arithmetic mean ratio of power: 0 = tonal, 1 = noise-like.
    pub flatness: f32,
    /// Frequency below which 85% of the energy lies, Hz.
    pub rolloff_hz: f32,
    /// Power-weighted standard deviation around the centroid, Hz.
    pub bandwidth_hz: f32,
}

/// Fraction of total energy the rolloff point contains.
const ROLLOFF_FRACTION: f32 = 0.85;

/// Compute spectral statistics for one magnitude frame.
///
/// `magnitude_db` holds `fft_size / 2` bins; bin `i` covers
/// `i · sample_rate / fft_size` Hz.
pub fn spectral_stats(magnitude_db: &[f32], sample_rate: u32) -> SpectralStats {
    if magnitude_db.is_empty() {
        return SpectralStats::default();
    }
    let bin_width = sample_rate as f32 / (magnitude_db.len() * 2) as f32;

    let mut power_sum = 0.0f64;
    let mut weighted_sum = 0.0f64;
    let mut log_sum = 0.0f64;
    for (i, &db) in magnitude_db.iter().enumerate() {
        let p = f64::from(db_to_power(db));
        power_sum += p;
        weighted_sum += f64::from(i as f32 * bin_width) * p;
        log_sum += p.max(1e-20).ln();
    }

    if power_sum <= 1e-18 {
        return SpectralStats::default();
    }

    let centroid_hz = (weighted_sum / power_sum) as f32;

    let n = magnitude_db.len() as f64;
    let geometric_mean = (log_sum / n).exp();
    let arithmetic_mean = power_sum / n;
    let flatness = (geometric_mean / arithmetic_mean).clamp(0.0, 1.0) as f32;

    let threshold = power_sum * f64::from(ROLLOFF_FRACTION);
    let mut cumulative = 0.0f64;
    let mut rolloff_hz = sample_rate as f32 / 2.0;
    for (i, &db) in magnitude_db.iter().enumerate() {
        cumulative += f64::from(db_to_power(db));
        if cumulative >= threshold {
            rolloff_hz = i as f32 * bin_width;
            break;
        }
    }

    let mut spread = 0.0f64;
    for (i, &db) in magnitude_db.iter().enumerate() {
        let d = f64::from(i as f32 * bin_width - centroid_hz);
        spread += d * d * f64::from(db_to_power(db));
    }
    let bandwidth_hz = (spread / power_sum).sqrt() as f32;

    SpectralStats {
        centroid_hz,
        flatness,
        rolloff_hz,
        bandwidth_hz,
    }
}
