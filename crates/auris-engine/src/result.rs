//! The merged per-frame result record.

use auris_analysis::{
    ChromaResult, ClippingResult, DcOffsetResult, DynamicsResult, FeedbackResult,
    InharmonicityResult, LoudnessResult, MfccResult, OnsetResult, PhaseResult, PitchResult,
    Rt60Result, RtaResult, SnrResult, SpectralStats, StandingWaveResult, ThdResult,
    TruePeakResult, ZcrResult,
};

/// Every enabled analyzer's output for one frame.
///
/// A field is `Some` exactly when its module was enabled while the frame
/// was processed; disabling a module omits the field without clearing the
/// module's accumulated state.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    /// Index of the frame this result describes.
    pub frame_index: u64,
    /// Capture timestamp of the frame, seconds.
    pub timestamp: f64,
    /// 1/3-octave band levels.
    pub rta: Option<RtaResult>,
    /// Spectral shape statistics.
    pub spectral: Option<SpectralStats>,
    /// Chromagram and key estimate.
    pub chroma: Option<ChromaResult>,
    /// Cepstral coefficients.
    pub mfcc: Option<MfccResult>,
    /// Total harmonic distortion.
    pub thd: Option<ThdResult>,
    /// Partial deviations.
    pub inharmonicity: Option<InharmonicityResult>,
    /// Dynamics measurements.
    pub dynamics: Option<DynamicsResult>,
    /// True-peak measurements.
    pub true_peak: Option<TruePeakResult>,
    /// Zero-crossing rate.
    pub zcr: Option<ZcrResult>,
    /// DC offset.
    pub dc_offset: Option<DcOffsetResult>,
    /// Clipping state.
    pub clipping: Option<ClippingResult>,
    /// Pitch estimate.
    pub pitch: Option<PitchResult>,
    /// Stereo phase correlation.
    pub phase: Option<PhaseResult>,
    /// RT60 state.
    pub rt60: Option<Rt60Result>,
    /// Loudness readings.
    pub loudness: Option<LoudnessResult>,
    /// Onset/tempo state.
    pub onset: Option<OnsetResult>,
    /// Feedback assessment.
    pub feedback: Option<FeedbackResult>,
    /// Standing-wave candidates.
    pub standing_wave: Option<StandingWaveResult>,
    /// Signal-to-noise state.
    pub snr: Option<SnrResult>,
}
