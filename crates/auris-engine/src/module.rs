//! The closed analyzer catalog and the active-module set.
//!
//! Every analyzer the engine can run is one variant of [`ModuleKind`];
//! dispatch is exhaustive, so adding an analyzer is a compile-checked change
//! rather than a string registration. [`ModuleSet`] is a small bit-set over
//! the catalog used for the configuration's active-module selection.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One analyzer in the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// 1/3-octave band levels
    Rta,
    /// Spectral centroid/flatness/rolloff/bandwidth
    Spectral,
    /// Chromagram and key estimation
    Chroma,
    /// Mel-frequency cepstral coefficients
    Mfcc,
    /// Total harmonic distortion
    Thd,
    /// Partial-deviation measurement
    Inharmonicity,
    /// RMS/peak/crest dynamics
    Dynamics,
    /// Oversampled peak with hold
    TruePeak,
    /// Zero-crossing rate
    Zcr,
    /// DC offset
    DcOffset,
    /// Clipping detection
    Clipping,
    /// YIN pitch tracking
    Pitch,
    /// Stereo phase correlation
    Phase,
    /// RT60 decay estimation
    Rt60,
    /// LUFS loudness metering
    Loudness,
    /// Onset detection and tempo
    Onset,
    /// Feedback/ringing detection
    Feedback,
    /// Standing-wave detection
    StandingWave,
    /// Signal-to-noise estimation
    Snr,
}

/// Attempted to parse a module name outside the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analysis module: {0}")]
pub struct UnknownModule(pub String);

impl ModuleKind {
    /// Every analyzer, in catalog order.
    pub const ALL: [ModuleKind; 19] = [
        ModuleKind::Rta,
        ModuleKind::Spectral,
        ModuleKind::Chroma,
        ModuleKind::Mfcc,
        ModuleKind::Thd,
        ModuleKind::Inharmonicity,
        ModuleKind::Dynamics,
        ModuleKind::TruePeak,
        ModuleKind::Zcr,
        ModuleKind::DcOffset,
        ModuleKind::Clipping,
        ModuleKind::Pitch,
        ModuleKind::Phase,
        ModuleKind::Rt60,
        ModuleKind::Loudness,
        ModuleKind::Onset,
        ModuleKind::Feedback,
        ModuleKind::StandingWave,
        ModuleKind::Snr,
    ];

    /// Stable lowercase name used in configuration files and results.
    pub const fn name(&self) -> &'static str {
        match self {
            ModuleKind::Rta => "rta",
            ModuleKind::Spectral => "spectral",
            ModuleKind::Chroma => "chroma",
            ModuleKind::Mfcc => "mfcc",
            ModuleKind::Thd => "thd",
            ModuleKind::Inharmonicity => "inharmonicity",
            ModuleKind::Dynamics => "dynamics",
            ModuleKind::TruePeak => "true_peak",
            ModuleKind::Zcr => "zcr",
            ModuleKind::DcOffset => "dc_offset",
            ModuleKind::Clipping => "clipping",
            ModuleKind::Pitch => "pitch",
            ModuleKind::Phase => "phase",
            ModuleKind::Rt60 => "rt60",
            ModuleKind::Loudness => "loudness",
            ModuleKind::Onset => "onset",
            ModuleKind::Feedback => "feedback",
            ModuleKind::StandingWave => "standing_wave",
            ModuleKind::Snr => "snr",
        }
    }

    /// One-line description for front-end module pickers.
    pub const fn description(&self) -> &'static str {
        match self {
            ModuleKind::Rta => "1/3-octave real-time analyzer",
            ModuleKind::Spectral => "Spectral centroid, flatness, rolloff, bandwidth",
            ModuleKind::Chroma => "Chromagram and key estimation",
            ModuleKind::Mfcc => "Mel-frequency cepstral coefficients",
            ModuleKind::Thd => "Total harmonic distortion",
            ModuleKind::Inharmonicity => "Harmonic partial deviation",
            ModuleKind::Dynamics => "RMS, peak, crest factor and dynamic range",
            ModuleKind::TruePeak => "Inter-sample peak with broadcast ceiling check",
            ModuleKind::Zcr => "Zero-crossing rate",
            ModuleKind::DcOffset => "DC offset",
            ModuleKind::Clipping => "Clipping detection with hold",
            ModuleKind::Pitch => "YIN fundamental-frequency tracking",
            ModuleKind::Phase => "Stereo phase correlation",
            ModuleKind::Rt60 => "RT60 reverberation-time estimation",
            ModuleKind::Loudness => "LUFS loudness and loudness range",
            ModuleKind::Onset => "Onset detection and tempo",
            ModuleKind::Feedback => "Feedback/ringing detection with notch suggestion",
            ModuleKind::StandingWave => "Room-mode (standing wave) detection",
            ModuleKind::Snr => "Signal-to-noise ratio",
        }
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModuleKind {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKind::ALL
            .iter()
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Bit-set over the analyzer catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSet(u32);

impl ModuleSet {
    /// No modules enabled.
    pub const fn empty() -> Self {
        ModuleSet(0)
    }

    /// The full catalog.
    pub fn all() -> Self {
        let mut set = ModuleSet(0);
        for kind in ModuleKind::ALL {
            set.insert(kind);
        }
        set
    }

    /// True when `kind` is enabled.
    pub const fn contains(&self, kind: ModuleKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Enable `kind`.
    pub fn insert(&mut self, kind: ModuleKind) {
        self.0 |= kind.bit();
    }

    /// Disable `kind`.
    pub fn remove(&mut self, kind: ModuleKind) {
        self.0 &= !kind.bit();
    }

    /// Builder-style enable.
    pub fn with(mut self, kind: ModuleKind) -> Self {
        self.insert(kind);
        self
    }

    /// Builder-style disable.
    pub fn without(mut self, kind: ModuleKind) -> Self {
        self.remove(kind);
        self
    }

    /// Number of enabled modules.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when nothing is enabled.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the enabled modules in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = ModuleKind> + '_ {
        ModuleKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl Default for ModuleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<ModuleKind> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = ModuleKind>>(iter: I) -> Self {
        let mut set = ModuleSet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl Serialize for ModuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for kind in self.iter() {
            seq.serialize_element(kind.name())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ModuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = ModuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of analysis module names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ModuleSet, A::Error> {
                let mut set = ModuleSet::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let kind = name.parse::<ModuleKind>().map_err(de::Error::custom)?;
                    set.insert(kind);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor)
    }
}
