//! Harmonic-series analyzers: THD and inharmonicity.
//!
//! Both require a fundamental frequency supplied by the caller (the engine
//! runs the pitch tracker first and passes its confident estimate). Without
//! a valid fundamental they return a neutral result flagged not-applicable
//! rather than guessing.

use auris_dsp::db_to_power;

/// Lowest fundamental the harmonic analyzers accept, Hz.
const MIN_FUNDAMENTAL: f32 = 20.0;
/// Half-width of the power summation window around each harmonic, bins.
const THD_BIN_WINDOW: usize = 2;
/// Peak search span around each ideal harmonic, fraction of its frequency.
const SEARCH_SPAN: f32 = 0.05;
/// Level below which a harmonic peak is ignored, dBFS.
const HARMONIC_FLOOR_DB: f32 = -60.0;

/// Total harmonic distortion for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThdResult {
    /// THD, percent of fundamental amplitude, clamped to \[0, 100\].
    pub thd_percent: f32,
    /// The fundamental actually used, Hz.
    pub fundamental_hz: f32,
    /// Number of harmonics that fit below Nyquist.
    pub harmonic_count: usize,
    /// False when no valid fundamental was supplied.
    pub applicable: bool,
}

impl ThdResult {
    fn not_applicable() -> Self {
        Self {
            thd_percent: 0.0,
            fundamental_hz: 0.0,
            harmonic_count: 0,
            applicable: false,
        }
    }
}

/// Qualitative inharmonicity rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InharmonicityRating {
    /// Mean deviation below 0.5%
    VeryClean,
    /// Below 2%
    Normal,
    /// Below 5% (stretched partials, e.g. piano strings)
    Stretched,
    /// 5% and above
    High,
}

impl InharmonicityRating {
    fn from_deviation(percent: f32) -> Self {
        if percent < 0.5 {
            InharmonicityRating::VeryClean
        } else if percent < 2.0 {
            InharmonicityRating::Normal
        } else if percent < 5.0 {
            InharmonicityRating::Stretched
        } else {
            InharmonicityRating::High
        }
    }
}

/// Partial-deviation measurement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InharmonicityResult {
    /// Mean absolute deviation of found partials from their ideal
    /// positions, percent.
    pub deviation_percent: f32,
    /// Number of partials found above the level floor.
    pub harmonics_found: usize,
    /// Qualitative bucket for display.
    pub rating: InharmonicityRating,
    /// False when no valid fundamental was supplied.
    pub applicable: bool,
}

impl InharmonicityResult {
    fn not_applicable() -> Self {
        Self {
            deviation_percent: 0.0,
            harmonics_found: 0,
            rating: InharmonicityRating::VeryClean,
            applicable: false,
        }
    }
}

/// Sum linear power in a ±`THD_BIN_WINDOW` window around a bin.
fn window_power(magnitude_db: &[f32], center_bin: usize) -> f64 {
    let lo = center_bin.saturating_sub(THD_BIN_WINDOW);
    let hi = (center_bin + THD_BIN_WINDOW).min(magnitude_db.len() - 1);
    magnitude_db[lo..=hi]
        .iter()
        .map(|&db| f64::from(db_to_power(db)))
        .sum()
}

/// Measure THD against harmonics 2–8 of the supplied fundamental.
pub fn thd(magnitude_db: &[f32], sample_rate: u32, fundamental_hz: Option<f32>) -> ThdResult {
    let Some(f0) = fundamental_hz else {
        return ThdResult::not_applicable();
    };
    let nyquist = sample_rate as f32 / 2.0;
    if magnitude_db.is_empty() || f0 < MIN_FUNDAMENTAL || f0 >= nyquist {
        return ThdResult::not_applicable();
    }

    let fft_size = magnitude_db.len() * 2;
    let bin_width = sample_rate as f32 / fft_size as f32;

    let fundamental_bin = (f0 / bin_width).round() as usize;
    if fundamental_bin >= magnitude_db.len() {
        return ThdResult::not_applicable();
    }
    let fundamental_power = window_power(magnitude_db, fundamental_bin);

    let mut harmonic_power = 0.0f64;
    let mut harmonic_count = 0;
    for h in 2..=8u32 {
        let freq = f0 * h as f32;
        if freq >= nyquist {
            break;
        }
        let bin = (freq / bin_width).round() as usize;
        if bin >= magnitude_db.len() {
            break;
        }
        harmonic_power += window_power(magnitude_db, bin);
        harmonic_count += 1;
    }

    let thd_percent = if fundamental_power > 0.0 {
        (100.0 * (harmonic_power / fundamental_power).sqrt() as f32).clamp(0.0, 100.0)
    } else {
        0.0
    };

    ThdResult {
        thd_percent,
        fundamental_hz: f0,
        harmonic_count,
        applicable: true,
    }
}

/// Refine a peak bin to sub-bin precision on the dB magnitudes.
fn parabolic_peak(magnitude_db: &[f32], bin: usize) -> f32 {
    if bin == 0 || bin + 1 >= magnitude_db.len() {
        return bin as f32;
    }
    let left = magnitude_db[bin - 1];
    let mid = magnitude_db[bin];
    let right = magnitude_db[bin + 1];
    let denom = left - 2.0 * mid + right;
    if denom.abs() < 1e-9 {
        return bin as f32;
    }
    bin as f32 + (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}

/// Measure partial deviations for harmonics 2–10 of the supplied
/// fundamental.
pub fn inharmonicity(
    magnitude_db: &[f32],
    sample_rate: u32,
    fundamental_hz: Option<f32>,
) -> InharmonicityResult {
    let Some(f0) = fundamental_hz else {
        return InharmonicityResult::not_applicable();
    };
    let nyquist = sample_rate as f32 / 2.0;
    if magnitude_db.is_empty() || f0 < MIN_FUNDAMENTAL || f0 >= nyquist {
        return InharmonicityResult::not_applicable();
    }

    let fft_size = magnitude_db.len() * 2;
    let bin_width = sample_rate as f32 / fft_size as f32;

    let mut deviation_sum = 0.0f32;
    let mut found = 0usize;
    for h in 2..=10u32 {
        let ideal = f0 * h as f32;
        if ideal >= nyquist {
            break;
        }
        let lo_bin = ((ideal * (1.0 - SEARCH_SPAN)) / bin_width).floor() as usize;
        let hi_bin = (((ideal * (1.0 + SEARCH_SPAN)) / bin_width).ceil() as usize)
            .min(magnitude_db.len() - 1);
        if lo_bin > hi_bin {
            continue;
        }

        let mut peak_bin = lo_bin;
        for bin in lo_bin..=hi_bin {
            if magnitude_db[bin] > magnitude_db[peak_bin] {
                peak_bin = bin;
            }
        }
        if magnitude_db[peak_bin] <= HARMONIC_FLOOR_DB {
            continue;
        }

        let actual = parabolic_peak(magnitude_db, peak_bin) * bin_width;
        deviation_sum += 100.0 * ((actual - ideal) / ideal).abs();
        found += 1;
    }

    if found == 0 {
        return InharmonicityResult {
            deviation_percent: 0.0,
            harmonics_found: 0,
            rating: InharmonicityRating::VeryClean,
            applicable: true,
        };
    }

    let deviation_percent = deviation_sum / found as f32;
    InharmonicityResult {
        deviation_percent,
        harmonics_found: found,
        rating: InharmonicityRating::from_deviation(deviation_percent),
        applicable: true,
    }
}
