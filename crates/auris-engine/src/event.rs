//! Discrete engine events.
//!
//! Threshold-crossing analyzers surface their transitions as events queued
//! by the engine in frame order; consumers drain the queue at their own
//! cadence with [`crate::Engine::drain_events`]. Events are edge-triggered:
//! a sustained condition produces one event when it begins, not one per
//! frame.

/// A threshold crossing detected during frame processing.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The clipping detector opened a new episode.
    Clip {
        /// Frame that clipped.
        frame_index: u64,
        /// Frame peak, dBFS.
        peak_db: f32,
        /// Lifetime episode count including this one.
        total_events: u64,
    },
    /// The onset detector fired.
    Onset {
        /// Frame the onset landed on.
        frame_index: u64,
        /// Current smoothed tempo, BPM. Zero while tempo is unknown.
        bpm: f32,
    },
    /// The feedback detector confirmed sustained ringing.
    FeedbackRisk {
        /// Frame where persistence crossed the threshold.
        frame_index: u64,
        /// Suggested notch center, Hz.
        frequency_hz: f32,
        /// Suggested notch Q.
        q: f32,
        /// Suggested cut depth, dB.
        cut_db: f32,
    },
}
