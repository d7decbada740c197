//! Window function coefficient generation.
//!
//! The capture subsystem applies the window before its FFT; the analyzers
//! only need the coefficient tables (e.g. to undo window gain or to window a
//! block before an energy measurement). Formulas use the symmetric `N-1`
//! denominator per the IEC/ISO definitions.

use alloc::{vec, vec::Vec};
use core::f32::consts::PI;
use libm::cosf;

/// Window function types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Blackman window
    Blackman,
    /// Flat-top window (ISO 18431-2 five-term, for amplitude accuracy)
    FlatTop,
}

impl Window {
    /// Apply the window in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        if buffer.len() < 2 {
            return;
        }
        let denom = (buffer.len() - 1) as f32;
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - cosf(2.0 * PI * i as f32 / denom));
                    *sample *= w;
                }
            }
            Window::Blackman => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f32 / denom;
                    let w = 0.42 - 0.5 * cosf(x) + 0.08 * cosf(2.0 * x);
                    *sample *= w;
                }
            }
            Window::FlatTop => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f32 / denom;
                    let w = 0.21557895 - 0.41663158 * cosf(x) + 0.277263158 * cosf(2.0 * x)
                        - 0.083578947 * cosf(3.0 * x)
                        + 0.006947368 * cosf(4.0 * x);
                    *sample *= w;
                }
            }
        }
    }

    /// Coefficient table for a window of the given length.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }

    /// Short lowercase name, matching the configuration vocabulary.
    pub const fn name(&self) -> &'static str {
        match self {
            Window::Rectangular => "rectangular",
            Window::Hann => "hann",
            Window::Blackman => "blackman",
            Window::FlatTop => "flattop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_is_identity() {
        let coeffs = Window::Rectangular.coefficients(64);
        assert!(coeffs.iter().all(|&c| c == 1.0));
    }

    #[test]
    fn test_hann_endpoints_and_center() {
        let coeffs = Window::Hann.coefficients(101);
        assert!(coeffs[0].abs() < 1e-6);
        assert!(coeffs[100].abs() < 1e-6);
        assert!((coeffs[50] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_blackman_endpoints() {
        let coeffs = Window::Blackman.coefficients(101);
        // Exact Blackman reaches zero at both ends with the N-1 form
        assert!(coeffs[0].abs() < 1e-6);
        assert!(coeffs[100].abs() < 1e-6);
        assert!((coeffs[50] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flattop_center_and_negative_lobes() {
        let coeffs = Window::FlatTop.coefficients(101);
        let peak = 0.21557895 + 0.41663158 + 0.277263158 + 0.083578947 + 0.006947368;
        assert!((coeffs[50] - peak).abs() < 1e-4, "center was {}", coeffs[50]);
        // Flat-top dips below zero near the edges
        assert!(coeffs.iter().any(|&c| c < 0.0));
    }
}
