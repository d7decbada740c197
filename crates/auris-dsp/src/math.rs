//! Mathematical utility functions shared by the analyzers.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`linear_to_db`] / [`db_to_linear`] - amplitude (20·log10) domain
//! - [`power_to_db`] / [`db_to_power`] - power (10·log10) domain
//!
//! The convention throughout the engine is that non-positive linear input
//! maps to negative infinity in dB. Downstream meters rely on this: silence
//! reads as −∞, never as NaN or a sentinel constant.

use libm::{log10f, powf};

/// Convert a linear amplitude to decibels (20·log10).
///
/// Non-positive input returns `f32::NEG_INFINITY`.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear > 0.0 {
        20.0 * log10f(linear)
    } else {
        f32::NEG_INFINITY
    }
}

/// Convert decibels to a linear amplitude (10^(dB/20)).
///
/// `f32::NEG_INFINITY` input returns 0.0.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        powf(10.0, db / 20.0)
    }
}

/// Convert a power quantity to decibels (10·log10).
///
/// Non-positive input returns `f32::NEG_INFINITY`.
#[inline]
pub fn power_to_db(power: f32) -> f32 {
    if power > 0.0 {
        10.0 * log10f(power)
    } else {
        f32::NEG_INFINITY
    }
}

/// Convert decibels to a power quantity (10^(dB/10)).
#[inline]
pub fn db_to_power(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        powf(10.0, db / 10.0)
    }
}

/// Arithmetic mean of a slice. Empty input returns 0.0.
#[inline]
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population variance of a slice. Empty input returns 0.0.
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|&x| (x - m) * (x - m)).sum::<f32>() / values.len() as f32
}

/// Nearest-rank percentile of an ascending-sorted slice.
///
/// `p` is in \[0, 100\]. Empty input returns 0.0. The slice must already be
/// sorted; this function does not sort.
pub fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p / 100.0 * (sorted.len() - 1) as f32 + 0.5) as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Convert a frequency in Hz to the Mel scale.
#[inline]
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * log10f(1.0 + hz / 700.0)
}

/// Convert a Mel value back to Hz.
#[inline]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (powf(10.0, mel / 2595.0) - 1.0)
}
