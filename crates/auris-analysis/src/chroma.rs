//! Chromagram and musical key estimation.
//!
//! Spectral energy between 20 Hz and 20 kHz is folded into 12 pitch classes,
//! then the Krumhansl-Schmuckler profiles are correlated against all 24
//! candidate keys (12 tonics × major/minor). The best-correlating rotation
//! wins; its correlation doubles as the confidence.

use auris_dsp::db_to_power;

/// Pitch-class names, C-rooted.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Krumhansl-Kessler major key profile.
const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Kessler minor key profile.
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Major or minor mode of the estimated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Major mode
    Major,
    /// Minor mode
    Minor,
}

impl KeyMode {
    /// Lowercase mode name.
    pub const fn name(&self) -> &'static str {
        match self {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        }
    }
}

/// Chromagram and estimated key for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaResult {
    /// Pitch-class energies normalized by their maximum, C first.
    pub chroma: [f32; 12],
    /// Estimated tonic pitch class, e.g. "G".
    pub key: &'static str,
    /// Estimated mode.
    pub mode: KeyMode,
    /// Best profile correlation, clamped to \[0, 1\]. Zero for silence.
    pub confidence: f32,
}

impl ChromaResult {
    /// Key and mode as one display string, e.g. `"G major"`.
    pub fn key_string(&self) -> String {
        format!("{} {}", self.key, self.mode.name())
    }

    fn silent() -> Self {
        Self {
            chroma: [0.0; 12],
            key: PITCH_CLASS_NAMES[0],
            mode: KeyMode::Major,
            confidence: 0.0,
        }
    }
}

/// Pearson correlation between two 12-vectors.
fn correlation(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let mean_a = a.iter().sum::<f32>() / 12.0;
    let mean_b = b.iter().sum::<f32>() / 12.0;
    let mut num = 0.0f32;
    let mut den_a = 0.0f32;
    let mut den_b = 0.0f32;
    for i in 0..12 {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        num += da * db;
        den_a += da * da;
        den_b += db * db;
    }
    let den = (den_a * den_b).sqrt();
    if den > 1e-10 { num / den } else { 0.0 }
}

/// Fold a magnitude frame into a chromagram and estimate the key.
pub fn estimate_key(magnitude_db: &[f32], sample_rate: u32) -> ChromaResult {
    if magnitude_db.is_empty() {
        return ChromaResult::silent();
    }
    let fft_size = magnitude_db.len() * 2;
    let bin_width = sample_rate as f32 / fft_size as f32;

    let mut chroma = [0.0f32; 12];
    for (i, &db) in magnitude_db.iter().enumerate() {
        let freq = i as f32 * bin_width;
        if !(20.0..=20000.0).contains(&freq) {
            continue;
        }
        let midi = 12.0 * (freq / 440.0).log2() + 69.0;
        let pitch_class = (midi.round() as i32).rem_euclid(12) as usize;
        chroma[pitch_class] += db_to_power(db);
    }

    let max = chroma.iter().fold(0.0f32, |m, &c| m.max(c));
    if max <= 0.0 {
        return ChromaResult::silent();
    }
    for c in &mut chroma {
        *c /= max;
    }

    let mut best = (0usize, KeyMode::Major, f32::NEG_INFINITY);
    for tonic in 0..12 {
        // Rotate the chromagram so `tonic` sits at index 0
        let mut rotated = [0.0f32; 12];
        for (i, r) in rotated.iter_mut().enumerate() {
            *r = chroma[(i + tonic) % 12];
        }
        let major = correlation(&rotated, &MAJOR_PROFILE);
        let minor = correlation(&rotated, &MINOR_PROFILE);
        if major > best.2 {
            best = (tonic, KeyMode::Major, major);
        }
        if minor > best.2 {
            best = (tonic, KeyMode::Minor, minor);
        }
    }

    ChromaResult {
        chroma,
        key: PITCH_CLASS_NAMES[best.0],
        mode: best.1,
        confidence: best.2.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Place profile-shaped energy on the C5..B5 octave, rotated to `tonic`.
    fn profile_spectrum(profile: &[f32; 12], tonic: usize, sample_rate: u32) -> Vec<f32> {
        let fft_size = 4096;
        let bin_width = sample_rate as f32 / fft_size as f32;
        let mut spectrum = vec![-100.0f32; fft_size / 2];
        for pc in 0..12 {
            // MIDI 72 is C5; semitone spacing up there comfortably exceeds
            // the bin width at 48 kHz / 4096
            let midi = 72 + pc;
            let freq = 440.0 * 2.0f32.powf((midi as f32 - 69.0) / 12.0);
            let bin = (freq / bin_width).round() as usize;
            let strength = profile[(pc + 12 - tonic) % 12];
            spectrum[bin] = 10.0 * (strength / 6.35).log10();
        }
        spectrum
    }

    #[test]
    fn test_g_major_profile_detected() {
        let spectrum = profile_spectrum(&MAJOR_PROFILE, 7, 48000);
        let result = estimate_key(&spectrum, 48000);
        assert_eq!(result.key, "G");
        assert_eq!(result.mode, KeyMode::Major);
        assert_eq!(result.key_string(), "G major");
        assert!(result.confidence > 0.8, "confidence {}", result.confidence);
    }

    #[test]
    fn test_a_minor_profile_detected() {
        let spectrum = profile_spectrum(&MINOR_PROFILE, 9, 48000);
        let result = estimate_key(&spectrum, 48000);
        assert_eq!(result.key, "A");
        assert_eq!(result.mode, KeyMode::Minor);
    }

    #[test]
    fn test_chroma_normalized_by_maximum() {
        let spectrum = profile_spectrum(&MAJOR_PROFILE, 0, 48000);
        let result = estimate_key(&spectrum, 48000);
        let max = result.chroma.iter().fold(0.0f32, |m, &c| m.max(c));
        assert!((max - 1.0).abs() < 1e-6);
        assert!(result.chroma.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_silence_is_neutral() {
        let result = estimate_key(&vec![f32::NEG_INFINITY; 2048], 48000);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.chroma, [0.0; 12]);
    }
}
