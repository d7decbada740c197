//! Error types for configuration and frame-contract violations.
//!
//! Configuration problems surface once, at construction or file-load time.
//! Frame-contract violations (wrong buffer lengths, mismatched rates) are
//! programming errors in the caller: the same contract must hold for every
//! frame of a session, so they are reported as errors rather than silently
//! skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating an [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// FFT size is not a power of two (or is too small to analyze)
    #[error("FFT size must be a power of two of at least 32, got {0}")]
    InvalidFftSize(usize),

    /// The dB display range is empty or inverted
    #[error("invalid dB range: min {min} must lie below max {max}")]
    InvalidDbRange {
        /// Configured lower bound of the display range.
        min: f32,
        /// Configured upper bound of the display range.
        max: f32,
    },

    /// Display smoothing constant outside [0, 1)
    #[error("smoothing must lie within [0, 1), got {0}")]
    InvalidSmoothing(f32),

    /// Failed to read a config file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a config file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Create a read-file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write-file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by [`crate::Engine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration rejected at construction time
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A frame buffer has the wrong length for the configured FFT size
    #[error("frame {frame_index}: {field} has length {got}, expected {expected}")]
    FrameLength {
        /// Index of the offending frame.
        frame_index: u64,
        /// Which buffer violated the contract.
        field: &'static str,
        /// Length the configuration requires.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// A frame was produced at a different sample rate than the engine
    /// was constructed for
    #[error("frame {frame_index}: sample rate {got} Hz differs from configured {expected} Hz")]
    SampleRateMismatch {
        /// Index of the offending frame.
        frame_index: u64,
        /// Sample rate the engine was constructed with.
        expected: u32,
        /// Sample rate carried by the frame.
        got: u32,
    },
}
