//! Signal-integrity checks: zero-crossing rate, DC offset, clipping.
//!
//! ZCR and DC offset are pure per-frame measurements; the clipping detector
//! keeps a hold counter so a momentary over stays visible on a meter, plus a
//! lifetime event counter that increments once per clipping episode.

use auris_dsp::linear_to_db;

/// Sample magnitude treated as digital full scale.
const CLIP_SAMPLE_THRESHOLD: f32 = 0.9999;
/// Frame peak above this declares a clip event, dBFS.
const CLIP_EVENT_DB: f32 = -0.5;
/// Frames the clip indicator stays lit after an event.
const CLIP_HOLD_FRAMES: u32 = 60;

/// Spectral character implied by the zero-crossing rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZcrClass {
    /// Below 1 kHz equivalent: pitched/tonal material
    Tonal,
    /// 1–3 kHz equivalent
    Mixed,
    /// Above 3 kHz equivalent: noise-like material
    Noisy,
}

/// Zero-crossing measurement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZcrResult {
    /// Crossing rate expressed as an equivalent frequency, Hz.
    pub rate_hz: f32,
    /// Number of sign changes in the frame.
    pub crossings: usize,
    /// Qualitative bucket.
    pub class: ZcrClass,
}

/// Count sign changes and normalize by twice the frame duration.
pub fn zero_crossing_rate(samples: &[f32], sample_rate: u32) -> ZcrResult {
    let mut crossings = 0usize;
    for pair in samples.windows(2) {
        if pair[0] * pair[1] < 0.0 {
            crossings += 1;
        }
    }
    let duration = samples.len() as f32 / sample_rate as f32;
    let rate_hz = if duration > 0.0 {
        crossings as f32 / (2.0 * duration)
    } else {
        0.0
    };
    let class = if rate_hz < 1000.0 {
        ZcrClass::Tonal
    } else if rate_hz <= 3000.0 {
        ZcrClass::Mixed
    } else {
        ZcrClass::Noisy
    };
    ZcrResult {
        rate_hz,
        crossings,
        class,
    }
}

/// DC-offset severity bucket, as a fraction of full scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcSeverity {
    /// Below 0.5% of full scale
    Ok,
    /// 0.5–2%
    Warning,
    /// 2% and above
    Critical,
}

/// DC-offset measurement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcOffsetResult {
    /// Mean sample value, signed.
    pub offset: f32,
    /// Magnitude as percent of full scale.
    pub percent: f32,
    /// Severity bucket.
    pub severity: DcSeverity,
}

/// Measure the mean sample value of one frame.
pub fn dc_offset(samples: &[f32]) -> DcOffsetResult {
    let offset = if samples.is_empty() {
        0.0
    } else {
        (samples.iter().map(|&s| f64::from(s)).sum::<f64>() / samples.len() as f64) as f32
    };
    let percent = offset.abs() * 100.0;
    let severity = if percent < 0.5 {
        DcSeverity::Ok
    } else if percent < 2.0 {
        DcSeverity::Warning
    } else {
        DcSeverity::Critical
    };
    DcOffsetResult {
        offset,
        percent,
        severity,
    }
}

/// Clipping measurement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippingResult {
    /// True while the hold window is active.
    pub is_clipping: bool,
    /// True only on the frame that started a clipping episode.
    pub new_event: bool,
    /// Samples at or above full scale in this frame.
    pub clipped_samples: usize,
    /// Frame peak, dBFS. −∞ for silence.
    pub peak_db: f32,
    /// Clipping episodes since the last reset.
    pub total_clip_events: u64,
}

/// Clipping detector with hold and lifetime event counting.
#[derive(Debug, Clone)]
pub struct ClippingDetector {
    hold_frames: u32,
    total_events: u64,
}

impl ClippingDetector {
    /// Create a detector with no history.
    pub fn new() -> Self {
        Self {
            hold_frames: 0,
            total_events: 0,
        }
    }

    /// Examine one sample frame.
    ///
    /// A new event is declared only when the frame clips while no hold is
    /// active, so a sustained over counts once.
    pub fn process(&mut self, samples: &[f32]) -> ClippingResult {
        let mut peak = 0.0f32;
        let mut clipped_samples = 0usize;
        for &s in samples {
            let magnitude = s.abs();
            peak = peak.max(magnitude);
            if magnitude >= CLIP_SAMPLE_THRESHOLD {
                clipped_samples += 1;
            }
        }
        let peak_db = linear_to_db(peak);
        let clipping_now = peak_db > CLIP_EVENT_DB;

        let new_event = clipping_now && self.hold_frames == 0;
        if new_event {
            self.total_events += 1;
        }
        if clipping_now {
            self.hold_frames = CLIP_HOLD_FRAMES;
        } else {
            self.hold_frames = self.hold_frames.saturating_sub(1);
        }

        ClippingResult {
            is_clipping: self.hold_frames > 0,
            new_event,
            clipped_samples,
            peak_db,
            total_clip_events: self.total_events,
        }
    }

    /// Clear the hold and the lifetime counter.
    pub fn reset(&mut self) {
        self.hold_frames = 0;
        self.total_events = 0;
    }
}

impl Default for ClippingDetector {
    fn default() -> Self {
        Self::new()
    }
}
