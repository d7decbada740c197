//! Session-level aggregation of per-frame results.
//!
//! A thin fold over [`AnalysisResult`] values for end-of-session summaries:
//! running peak, last loudness, event counters, last-known key and tempo.
//! It is a consumer of the engine's output, not an analyzer.

use crate::result::AnalysisResult;

/// Running totals across one monitoring session.
#[derive(Debug, Clone)]
pub struct SessionAggregate {
    /// Frames folded so far.
    pub frames: u64,
    /// Highest true peak observed, dBTP.
    pub max_true_peak_dbtp: f32,
    /// Most recent integrated loudness, LUFS.
    pub integrated_lufs: f32,
    /// Total clipping episodes.
    pub clip_events: u64,
    /// Total feedback-risk episodes.
    pub feedback_events: u64,
    /// Last confidently estimated key, e.g. "G major".
    pub last_key: Option<String>,
    /// Last reported tempo, BPM.
    pub last_bpm: Option<f32>,
}

impl SessionAggregate {
    /// Start an empty session summary.
    pub fn new() -> Self {
        Self {
            frames: 0,
            max_true_peak_dbtp: f32::NEG_INFINITY,
            integrated_lufs: f32::NEG_INFINITY,
            clip_events: 0,
            feedback_events: 0,
            last_key: None,
            last_bpm: None,
        }
    }

    /// Fold one frame's result into the summary.
    pub fn fold(&mut self, result: &AnalysisResult) {
        self.frames += 1;

        if let Some(tp) = &result.true_peak {
            self.max_true_peak_dbtp = self.max_true_peak_dbtp.max(tp.max_dbtp);
        }
        if let Some(loudness) = &result.loudness {
            self.integrated_lufs = loudness.integrated_lufs;
        }
        if let Some(clipping) = &result.clipping {
            self.clip_events = self.clip_events.max(clipping.total_clip_events);
        }
        if let Some(feedback) = &result.feedback {
            if feedback.new_event {
                self.feedback_events += 1;
            }
        }
        if let Some(chroma) = &result.chroma {
            if chroma.confidence > 0.5 {
                self.last_key = Some(chroma.key_string());
            }
        }
        if let Some(onset) = &result.onset {
            if onset.bpm > 0.0 {
                self.last_bpm = Some(onset.bpm);
            }
        }
    }
}

impl Default for SessionAggregate {
    fn default() -> Self {
        Self::new()
    }
}
