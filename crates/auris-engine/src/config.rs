//! Engine configuration with TOML round-trip and construction-time
//! validation.
//!
//! Invalid values are reported once, when the config is validated, never
//! per frame. Unsupported window or module names fail at parse time with a
//! typed error instead of silently falling back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use auris_dsp::Window;

use crate::error::ConfigError;
use crate::module::ModuleSet;

/// Window function selection, matching the capture subsystem's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Hann window
    #[default]
    Hann,
    /// Blackman window
    Blackman,
    /// Flat-top window
    Flattop,
    /// No windowing
    Rectangular,
}

impl WindowKind {
    /// The DSP-layer window this selection maps to.
    pub const fn to_window(self) -> Window {
        match self {
            WindowKind::Hann => Window::Hann,
            WindowKind::Blackman => Window::Blackman,
            WindowKind::Flattop => Window::FlatTop,
            WindowKind::Rectangular => Window::Rectangular,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// FFT size of the capture pipeline. Power of two.
    pub fft_size: usize,
    /// Lower edge of the magnitude display range, dBFS.
    pub min_db: f32,
    /// Upper edge of the magnitude display range, dBFS.
    pub max_db: f32,
    /// Window function the capture subsystem applies before its FFT.
    pub window: WindowKind,
    /// Apply the A-weighting correction to the RTA's band levels.
    pub use_a_weighting: bool,
    /// Display smoothing time constant in \[0, 1). Carried for display
    /// consumers; the capture subsystem applies it before frames reach the
    /// engine, so core math never uses it.
    pub smoothing: f32,
    /// Which analyzers run each frame.
    pub modules: ModuleSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 4096,
            min_db: -100.0,
            max_db: 0.0,
            window: WindowKind::Hann,
            use_a_weighting: false,
            smoothing: 0.8,
            modules: ModuleSet::all(),
        }
    }
}

impl EngineConfig {
    /// Check every field once; the engine refuses to construct on error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 32 || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        if self.min_db >= self.max_db {
            return Err(ConfigError::InvalidDbRange {
                min: self.min_db,
                max: self.max_db,
            });
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&contents)
    }

    /// Write the config as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::write_file(path, e))
    }
}
