//! Real-time analyzer: 1/3-octave band levels.
//!
//! Bins are folded into the 31 standard IEC 61260 bands (20 Hz – 20 kHz) by
//! averaging linear power across each band, then re-expressed in dB and
//! normalized into \[0, 1\] against the configured dB range for meter
//! display.

use auris_dsp::{db_to_power, power_to_db};

/// IEC 61260 nominal 1/3-octave center frequencies.
const CENTER_FREQUENCIES: [f32; 31] = [
    20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0,
    500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// One 1/3-octave band level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLevel {
    /// Nominal band center, Hz.
    pub center_hz: f32,
    /// Average band level, dBFS (clamped to the configured range).
    pub level_db: f32,
    /// Level normalized into \[0, 1\] against the configured dB range.
    pub normalized: f32,
}

/// Per-frame band levels, low to high.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtaResult {
    /// Band levels for every band whose passband lies below Nyquist.
    pub bands: Vec<BandLevel>,
}

/// 1/3-octave band analyzer.
///
/// Stateless per call; carries only the configured dB display range.
#[derive(Debug, Clone)]
pub struct ThirdOctaveAnalyzer {
    min_db: f32,
    max_db: f32,
}

impl ThirdOctaveAnalyzer {
    /// Create an analyzer normalizing into the given dB range.
    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db }
    }

    /// Fold one magnitude frame into band levels.
    pub fn analyze(&self, magnitude_db: &[f32], sample_rate: u32) -> RtaResult {
        if magnitude_db.is_empty() {
            return RtaResult::default();
        }
        let fft_size = magnitude_db.len() * 2;
        let bin_width = sample_rate as f32 / fft_size as f32;
        let nyquist = sample_rate as f32 / 2.0;
        let range = self.max_db - self.min_db;

        // Band edges are one sixth of an octave either side of center
        let edge_ratio = 2.0f32.powf(1.0 / 6.0);

        let mut bands = Vec::with_capacity(CENTER_FREQUENCIES.len());
        for &center in &CENTER_FREQUENCIES {
            let lo = center / edge_ratio;
            let hi = center * edge_ratio;
            if lo >= nyquist {
                break;
            }

            let lo_bin = (lo / bin_width).ceil() as usize;
            let hi_bin = ((hi / bin_width).floor() as usize).min(magnitude_db.len() - 1);

            let level_db = if lo_bin > hi_bin {
                // Band narrower than one bin: sample the nearest bin
                let bin = ((center / bin_width).round() as usize).min(magnitude_db.len() - 1);
                magnitude_db[bin]
            } else {
                let mut power = 0.0f64;
                for &db in &magnitude_db[lo_bin..=hi_bin] {
                    power += f64::from(db_to_power(db));
                }
                power_to_db((power / (hi_bin - lo_bin + 1) as f64) as f32)
            };

            let level_db = level_db.clamp(self.min_db, self.max_db);
            let normalized = if range > 0.0 {
                ((level_db - self.min_db) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };

            bands.push(BandLevel {
                center_hz: center,
                level_db,
                normalized,
            });
        }

        RtaResult { bands }
    }
}
