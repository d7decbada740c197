//! The frame-synchronous orchestrator.
//!
//! One `Engine` owns every analyzer's state for one session. All state is
//! constructed up front from the validated configuration, so lifetimes are
//! auditable and the per-frame path never branches on "first use". Frames
//! are processed strictly one at a time; the engine is single-threaded by
//! construction and a parallel capture pipeline must hand over complete,
//! immutable frames.
//!
//! Cross-module data flow is explicit: the pitch tracker runs before the
//! harmonic analyzers and its confident fundamental is passed to them as a
//! parameter. Threshold transitions are queued as [`EngineEvent`]s for the
//! consumer to drain.

use std::collections::VecDeque;

use tracing::{debug, trace};

use auris_analysis::{
    ClippingDetector, DynamicsMeter, FeedbackDetector, LoudnessMeter, MfccExtractor,
    OnsetDetector, PitchDetector, Rt60Estimator, SnrEstimator, StandingWaveDetector,
    ThirdOctaveAnalyzer, TruePeakMeter, dc_offset, estimate_key, inharmonicity,
    phase_correlation, spectral_stats, thd, zero_crossing_rate,
};
use auris_dsp::AWeightingTable;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::event::EngineEvent;
use crate::frame::AnalysisFrame;
use crate::module::{ModuleKind, ModuleSet};
use crate::result::AnalysisResult;

/// Stateful analysis engine for one monitoring session.
pub struct Engine {
    config: EngineConfig,
    sample_rate: u32,

    a_weighting: AWeightingTable,
    weighted_scratch: Vec<f32>,

    rta: ThirdOctaveAnalyzer,
    mfcc: MfccExtractor,
    pitch: PitchDetector,
    dynamics: DynamicsMeter,
    true_peak: TruePeakMeter,
    clipping: ClippingDetector,
    loudness: LoudnessMeter,
    onset: OnsetDetector,
    feedback: FeedbackDetector,
    rt60: Rt60Estimator,
    standing_wave: StandingWaveDetector,
    snr: SnrEstimator,

    events: VecDeque<EngineEvent>,
}

impl Engine {
    /// Construct an engine and all module state from a validated
    /// configuration and the session's sample rate.
    pub fn new(config: EngineConfig, sample_rate: u32) -> Result<Self, EngineError> {
        config.validate()?;
        debug!(
            fft_size = config.fft_size,
            sample_rate,
            modules = config.modules.len(),
            "constructing analysis engine"
        );

        Ok(Self {
            a_weighting: AWeightingTable::new(sample_rate, config.fft_size),
            weighted_scratch: vec![0.0; config.fft_size / 2],
            rta: ThirdOctaveAnalyzer::new(config.min_db, config.max_db),
            mfcc: MfccExtractor::new(sample_rate, config.fft_size),
            pitch: PitchDetector::new(config.fft_size),
            dynamics: DynamicsMeter::new(),
            true_peak: TruePeakMeter::new(),
            clipping: ClippingDetector::new(),
            loudness: LoudnessMeter::new(sample_rate),
            onset: OnsetDetector::new(sample_rate, config.fft_size),
            feedback: FeedbackDetector::new(),
            rt60: Rt60Estimator::new(),
            standing_wave: StandingWaveDetector::new(),
            snr: SnrEstimator::new(),
            events: VecDeque::new(),
            config,
            sample_rate,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The session sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Enable or disable one analyzer.
    ///
    /// Disabling skips the module's state update and omits its result
    /// field; its accumulated history is kept, so re-enabling resumes the
    /// module rather than restarting it.
    pub fn set_module_enabled(&mut self, kind: ModuleKind, enabled: bool) {
        if enabled {
            self.config.modules.insert(kind);
        } else {
            self.config.modules.remove(kind);
        }
        debug!(module = %kind, enabled, "module toggled");
    }

    /// Replace the entire active-module selection.
    pub fn set_modules(&mut self, modules: ModuleSet) {
        self.config.modules = modules;
    }

    /// Process one frame through every enabled analyzer.
    ///
    /// Returns the merged result; threshold transitions are queued for
    /// [`Engine::drain_events`]. Contract violations (wrong lengths,
    /// mismatched sample rate) fail without touching analyzer state.
    pub fn process(&mut self, frame: &AnalysisFrame) -> Result<AnalysisResult, EngineError> {
        self.check_contract(frame)?;

        let modules = self.config.modules;
        let samples = &frame.time_samples;
        let spectrum = &frame.magnitude_db;
        let mut result = AnalysisResult {
            frame_index: frame.frame_index,
            timestamp: frame.timestamp,
            ..AnalysisResult::default()
        };

        // Pitch runs first: harmonic analyzers take its fundamental as an
        // explicit input
        let mut fundamental = None;
        if modules.contains(ModuleKind::Pitch) {
            let pitch = self.pitch.detect(samples, self.sample_rate);
            if pitch.frequency > 0.0 {
                fundamental = Some(pitch.frequency);
            }
            result.pitch = Some(pitch);
        }

        if modules.contains(ModuleKind::Rta) {
            let bands = if self.config.use_a_weighting {
                self.weighted_scratch.copy_from_slice(spectrum);
                self.a_weighting.apply(&mut self.weighted_scratch);
                self.rta.analyze(&self.weighted_scratch, self.sample_rate)
            } else {
                self.rta.analyze(spectrum, self.sample_rate)
            };
            result.rta = Some(bands);
        }
        if modules.contains(ModuleKind::Spectral) {
            result.spectral = Some(spectral_stats(spectrum, self.sample_rate));
        }
        if modules.contains(ModuleKind::Chroma) {
            result.chroma = Some(estimate_key(spectrum, self.sample_rate));
        }
        if modules.contains(ModuleKind::Mfcc) {
            result.mfcc = Some(self.mfcc.extract(spectrum));
        }
        if modules.contains(ModuleKind::Thd) {
            result.thd = Some(thd(spectrum, self.sample_rate, fundamental));
        }
        if modules.contains(ModuleKind::Inharmonicity) {
            result.inharmonicity = Some(inharmonicity(spectrum, self.sample_rate, fundamental));
        }

        if modules.contains(ModuleKind::Dynamics) {
            result.dynamics = Some(self.dynamics.process(samples));
        }
        if modules.contains(ModuleKind::TruePeak) {
            result.true_peak = Some(self.true_peak.process(samples));
        }
        if modules.contains(ModuleKind::Zcr) {
            result.zcr = Some(zero_crossing_rate(samples, self.sample_rate));
        }
        if modules.contains(ModuleKind::DcOffset) {
            result.dc_offset = Some(dc_offset(samples));
        }
        if modules.contains(ModuleKind::Clipping) {
            let clipping = self.clipping.process(samples);
            if clipping.new_event {
                debug!(
                    frame = frame.frame_index,
                    peak_db = clipping.peak_db,
                    "clip event"
                );
                self.events.push_back(EngineEvent::Clip {
                    frame_index: frame.frame_index,
                    peak_db: clipping.peak_db,
                    total_events: clipping.total_clip_events,
                });
            }
            result.clipping = Some(clipping);
        }
        if modules.contains(ModuleKind::Phase) {
            result.phase = Some(phase_correlation(samples, frame.right_samples.as_deref()));
        }

        if modules.contains(ModuleKind::Loudness) {
            result.loudness = Some(self.loudness.process(samples));
        }
        if modules.contains(ModuleKind::Onset) {
            let onset = self.onset.process(spectrum, frame.timestamp);
            if onset.is_onset {
                trace!(frame = frame.frame_index, bpm = onset.bpm, "onset");
                self.events.push_back(EngineEvent::Onset {
                    frame_index: frame.frame_index,
                    bpm: onset.bpm,
                });
            }
            result.onset = Some(onset);
        }
        if modules.contains(ModuleKind::Feedback) {
            let feedback = self.feedback.process(spectrum, self.sample_rate);
            if feedback.new_event {
                debug!(
                    frame = frame.frame_index,
                    frequency_hz = feedback.frequency_hz,
                    cut_db = feedback.cut_db,
                    "feedback risk"
                );
                self.events.push_back(EngineEvent::FeedbackRisk {
                    frame_index: frame.frame_index,
                    frequency_hz: feedback.frequency_hz,
                    q: feedback.q,
                    cut_db: feedback.cut_db,
                });
            }
            result.feedback = Some(feedback);
        }
        if modules.contains(ModuleKind::Rt60) {
            result.rt60 = Some(self.rt60.process(samples, frame.timestamp));
        }
        if modules.contains(ModuleKind::StandingWave) {
            result.standing_wave = Some(self.standing_wave.process(spectrum, self.sample_rate));
        }
        if modules.contains(ModuleKind::Snr) {
            result.snr = Some(self.snr.process(spectrum));
        }

        trace!(frame = frame.frame_index, "frame processed");
        Ok(result)
    }

    /// Take every event queued since the last drain, in frame order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// Restart the session: every module's accumulated state is cleared,
    /// configuration is kept.
    pub fn reset(&mut self) {
        self.dynamics.reset();
        self.true_peak.reset();
        self.clipping.reset();
        self.loudness.reset();
        self.onset.reset();
        self.feedback.reset();
        self.rt60.reset();
        self.standing_wave.reset();
        self.snr.reset();
        self.events.clear();
        debug!("engine state reset");
    }

    fn check_contract(&self, frame: &AnalysisFrame) -> Result<(), EngineError> {
        if frame.sample_rate != self.sample_rate {
            return Err(EngineError::SampleRateMismatch {
                frame_index: frame.frame_index,
                expected: self.sample_rate,
                got: frame.sample_rate,
            });
        }
        let fft_size = self.config.fft_size;
        if frame.fft_size != fft_size || frame.time_samples.len() != fft_size {
            return Err(EngineError::FrameLength {
                frame_index: frame.frame_index,
                field: "time_samples",
                expected: fft_size,
                got: frame.time_samples.len(),
            });
        }
        if frame.magnitude_db.len() != fft_size / 2 {
            return Err(EngineError::FrameLength {
                frame_index: frame.frame_index,
                field: "magnitude_db",
                expected: fft_size / 2,
                got: frame.magnitude_db.len(),
            });
        }
        if let Some(right) = &frame.right_samples {
            if right.len() != fft_size {
                return Err(EngineError::FrameLength {
                    frame_index: frame.frame_index,
                    field: "right_samples",
                    expected: fft_size,
                    got: right.len(),
                });
            }
        }
        Ok(())
    }
}
