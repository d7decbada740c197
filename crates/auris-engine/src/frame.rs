//! The per-frame input record.

/// One capture cycle's worth of input: the raw sample block and its
/// already-computed magnitude spectrum.
///
/// Frames are immutable once built and are owned by the caller for exactly
/// one [`crate::Engine::process`] invocation. The capture subsystem
/// guarantees `time_samples.len() == fft_size` and
/// `magnitude_db.len() == fft_size / 2`; the engine verifies the contract
/// and rejects violations as errors rather than skipping frames.
#[derive(Debug, Clone)]
pub struct AnalysisFrame {
    /// Time-domain samples, amplitude roughly in \[-1, 1\]. For stereo
    /// captures this is the left channel.
    pub time_samples: Vec<f32>,
    /// Optional right channel for phase-correlation analysis.
    pub right_samples: Option<Vec<f32>>,
    /// Magnitude spectrum, dBFS, clamped to the configured range,
    /// `fft_size / 2` bins.
    pub magnitude_db: Vec<f32>,
    /// Capture sample rate, Hz.
    pub sample_rate: u32,
    /// FFT size the spectrum was computed with.
    pub fft_size: usize,
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Capture timestamp, seconds since session start.
    pub timestamp: f64,
}

impl AnalysisFrame {
    /// Build a mono frame.
    pub fn new(
        time_samples: Vec<f32>,
        magnitude_db: Vec<f32>,
        sample_rate: u32,
        fft_size: usize,
        frame_index: u64,
        timestamp: f64,
    ) -> Self {
        Self {
            time_samples,
            right_samples: None,
            magnitude_db,
            sample_rate,
            fft_size,
            frame_index,
            timestamp,
        }
    }

    /// Attach a right channel, making the frame stereo.
    pub fn with_right_channel(mut self, right_samples: Vec<f32>) -> Self {
        self.right_samples = Some(right_samples);
        self
    }
}
