//! Type-II Discrete Cosine Transform.
//!
//! Direct O(N²) evaluation. The cepstral extractor only transforms 26 filter
//! energies per frame, so the quadratic form is cheaper than staging an
//! FFT-based fast path.

use alloc::{vec, vec::Vec};
use core::f32::consts::PI;
use libm::cosf;

/// Compute the DCT-II of `input`, producing `input.len()` real coefficients.
///
/// ```text
/// X[k] = Σ_{n=0}^{N-1} x[n] · cos(π/N · (n + 1/2) · k)
/// ```
pub fn dct_ii(input: &[f32]) -> Vec<f32> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }
    let mut output = vec![0.0f32; n];
    let scale = PI / n as f32;
    for (k, coeff) in output.iter_mut().enumerate() {
        let mut sum = 0.0f64;
        for (i, &x) in input.iter().enumerate() {
            sum += f64::from(x) * f64::from(cosf(scale * (i as f32 + 0.5) * k as f32));
        }
        *coeff = sum as f32;
    }
    output
}
