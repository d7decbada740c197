//! Auris Analysis - the signal-processing analyzer suite
//!
//! Each module in this crate is one analyzer of the live monitoring engine.
//! Frequency-domain analyzers consume a dBFS magnitude spectrum of
//! `fft_size / 2` bins; time-domain analyzers consume the raw sample block;
//! cross-domain analyzers carry multi-frame state and consume both.
//!
//! - [`rta`] - 1/3-octave band levels
//! - [`spectral`] - centroid, flatness, rolloff, bandwidth
//! - [`chroma`] - chromagram and Krumhansl-Schmuckler key estimation
//! - [`mfcc`] - mel-frequency cepstral coefficients
//! - [`pitch`] - YIN fundamental-frequency tracking
//! - [`harmonics`] - THD and inharmonicity (fundamental supplied by caller)
//! - [`dynamics`] - RMS/peak/crest with rolling dynamic-range scoring
//! - [`true_peak`] - oversampled peak with monotonic hold
//! - [`integrity`] - zero-crossing rate, DC offset, clipping detection
//! - [`phase`] - stereo phase correlation
//! - [`loudness`] - BS.1770-style LUFS metering with gating and LRA
//! - [`onset`] - spectral-flux onset detection and tempo estimation
//! - [`feedback`] - sustained narrow-band ringing detection
//! - [`room`] - RT60 decay estimation and standing-wave detection
//! - [`snr`] - signal-to-noise ratio with a calibration phase
//!
//! Analyzers never panic on degenerate signals: silence, empty bands and
//! missing fundamentals produce documented neutral outputs (§ error design
//! of the engine crate). Stateful analyzers expose `reset()` for session
//! restarts and are exclusively owned by one engine instance.

pub mod chroma;
pub mod dynamics;
pub mod feedback;
pub mod harmonics;
pub mod integrity;
pub mod loudness;
pub mod mfcc;
pub mod onset;
pub mod phase;
pub mod pitch;
pub mod room;
pub mod rta;
pub mod snr;
pub mod spectral;
pub mod true_peak;

pub use chroma::{ChromaResult, KeyMode, estimate_key};
pub use dynamics::{DynamicsMeter, DynamicsResult};
pub use feedback::{FeedbackDetector, FeedbackResult};
pub use harmonics::{InharmonicityRating, InharmonicityResult, ThdResult, inharmonicity, thd};
pub use integrity::{
    ClippingDetector, ClippingResult, DcOffsetResult, DcSeverity, ZcrClass, ZcrResult, dc_offset,
    zero_crossing_rate,
};
pub use loudness::{LoudnessMeter, LoudnessResult};
pub use mfcc::{MfccExtractor, MfccResult};
pub use onset::{OnsetDetector, OnsetResult};
pub use phase::{PhaseResult, phase_correlation};
pub use pitch::{Note, PitchDetector, PitchResult};
pub use room::{RoomMode, Rt60Estimator, Rt60Result, StandingWaveDetector, StandingWaveResult};
pub use rta::{BandLevel, RtaResult, ThirdOctaveAnalyzer};
pub use snr::{SnrEstimator, SnrResult};
pub use spectral::{SpectralStats, spectral_stats};
pub use true_peak::{TruePeakMeter, TruePeakResult};
