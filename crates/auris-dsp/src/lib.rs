//! Auris DSP - numeric primitives for real-time audio analysis
//!
//! This crate provides the foundational numerics shared by every analyzer in
//! the auris engine:
//!
//! - [`math`] - dB/linear conversion, mean/variance, percentiles, Hz↔Mel
//! - [`ring`] - fixed-capacity ring buffer for sliding-window statistics
//! - [`window`] - window function coefficient generation
//! - [`dct`] - Type-II Discrete Cosine Transform
//! - [`weighting`] - IEC 61672 A-weighting curve with a cached per-bin table
//! - [`biquad`] - second-order IIR section with RBJ cookbook coefficients
//!
//! # Design Principles
//!
//! - **Real-time safe**: per-sample paths allocate nothing
//! - **no_std compatible**: math via `libm`; disable the default `std`
//!   feature for embedded targets
//! - **Degenerate inputs produce defined outputs**: silence maps to
//!   negative-infinity dB, never NaN

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod biquad;
pub mod dct;
pub mod math;
pub mod ring;
pub mod weighting;
pub mod window;

pub use biquad::{Biquad, high_shelf_coefficients, highpass_coefficients};
pub use dct::dct_ii;
pub use math::{
    db_to_linear, db_to_power, hz_to_mel, linear_to_db, mean, mel_to_hz, percentile, power_to_db,
    variance,
};
pub use ring::Ring;
pub use weighting::{AWeightingTable, a_weighting_db};
pub use window::Window;
