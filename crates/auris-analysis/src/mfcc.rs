//! Mel-frequency cepstral coefficients.
//!
//! A 26-filter triangular mel filterbank spanning 20 Hz – 8 kHz is built once
//! per sample-rate/FFT-size pair and applied to the linear power spectrum;
//! filter energies are log-compressed and decorrelated with a DCT-II, keeping
//! the first 13 coefficients.

use auris_dsp::{db_to_power, dct_ii, hz_to_mel, mel_to_hz};

/// Number of triangular filters in the bank.
const NUM_FILTERS: usize = 26;
/// Number of cepstral coefficients kept.
const NUM_COEFFICIENTS: usize = 13;
/// Filterbank frequency span, Hz.
const MIN_FREQ: f32 = 20.0;
const MAX_FREQ: f32 = 8000.0;
/// Floor applied before the log to avoid log(0).
const LOG_FLOOR: f32 = 1e-10;

/// MFCC vector for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MfccResult {
    /// The first 13 cepstral coefficients; index 0 tracks overall log energy.
    pub coefficients: Vec<f32>,
}

/// Cepstral feature extractor with a cached filterbank.
///
/// Construction cost is paid once; `extract` is allocation-light and runs
/// per frame.
#[derive(Debug, Clone)]
pub struct MfccExtractor {
    filters: Vec<Vec<f32>>,
}

impl MfccExtractor {
    /// Build the filterbank for the given configuration.
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let num_bins = fft_size / 2;
        let nyquist = sample_rate as f32 / 2.0;
        let max_freq = MAX_FREQ.min(nyquist);

        let mel_min = hz_to_mel(MIN_FREQ);
        let mel_max = hz_to_mel(max_freq);

        // Mel-spaced boundary points mapped back to FFT bins
        let bin_points: Vec<usize> = (0..=NUM_FILTERS + 1)
            .map(|i| {
                let mel = mel_min + (mel_max - mel_min) * i as f32 / (NUM_FILTERS + 1) as f32;
                let hz = mel_to_hz(mel);
                (((fft_size as f32 + 1.0) * hz / sample_rate as f32).floor() as usize)
                    .min(num_bins - 1)
            })
            .collect();

        let mut filters = vec![vec![0.0f32; num_bins]; NUM_FILTERS];
        for (m, filter) in filters.iter_mut().enumerate() {
            let left = bin_points[m];
            let center = bin_points[m + 1];
            let right = bin_points[m + 2];

            if center > left {
                for k in left..center {
                    filter[k] = (k - left) as f32 / (center - left) as f32;
                }
            }
            if right > center {
                for k in center..right {
                    filter[k] = (right - k) as f32 / (right - center) as f32;
                }
            }
        }

        Self { filters }
    }

    /// Extract the MFCC vector for one magnitude frame.
    pub fn extract(&self, magnitude_db: &[f32]) -> MfccResult {
        let power: Vec<f32> = magnitude_db.iter().map(|&db| db_to_power(db)).collect();

        let log_energies: Vec<f32> = self
            .filters
            .iter()
            .map(|filter| {
                let energy: f32 = filter
                    .iter()
                    .zip(power.iter())
                    .map(|(&f, &p)| f * p)
                    .sum();
                energy.max(LOG_FLOOR).ln()
            })
            .collect();

        let mut coefficients = dct_ii(&log_energies);
        coefficients.truncate(NUM_COEFFICIENTS);
        MfccResult { coefficients }
    }

    /// Number of filters in the bank.
    pub fn num_filters(&self) -> usize {
        self.filters.len()
    }
}
