//! Window - Hamming analysis window.
//!
//! Every frame is tapered before autocorrelation so the abrupt frame edges do
//! not smear energy across the spectrum.
//!
//! # Formula
//!
//! ```text
//! w[i] = 0.54 - 0.46 × cos(2π × i / (N - 1)),   i = 0 .. N-1
//! ```
//!
//! The window is defined for N ≥ 2 only. A single-sample frame would divide by
//! zero, so it is rejected with [`Error::FrameTooShort`] instead of producing
//! NaN samples.

use std::f64::consts::PI;

use crate::error::{Error, Result};

const HAMMING_ALPHA: f64 = 0.54;
const HAMMING_BETA: f64 = 0.46;

/// Generate a Hamming window of length `n`.
///
/// # Errors
///
/// `Error::FrameTooShort` if `n < 2`.
pub fn hamming_window(n: usize) -> Result<Vec<f64>> {
    if n < 2 {
        return Err(Error::FrameTooShort(n));
    }

    let denom = (n - 1) as f64;
    Ok((0..n)
        .map(|i| HAMMING_ALPHA - HAMMING_BETA * (2.0 * PI * i as f64 / denom).cos())
        .collect())
}

/// Apply a Hamming window to a frame.
///
/// Returns a new frame of the same length; the input is left untouched.
///
/// # Example
///
/// ```
/// let windowed = vocalize::apply_window(&[1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(windowed.len(), 3);
/// assert!((windowed[1] - 1.0).abs() < 1e-12);
/// ```
pub fn apply_window(frame: &[f64]) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(frame.len());
    apply_window_into(frame, &mut out)?;
    Ok(out)
}

/// Apply a Hamming window, writing into a caller-owned buffer.
///
/// `out` is cleared and refilled, so a buffer kept between frames never
/// reallocates once it has grown to the frame size.
pub fn apply_window_into(frame: &[f64], out: &mut Vec<f64>) -> Result<()> {
    let n = frame.len();
    if n < 2 {
        return Err(Error::FrameTooShort(n));
    }

    let denom = (n - 1) as f64;
    out.clear();
    out.extend(frame.iter().enumerate().map(|(i, &s)| {
        s * (HAMMING_ALPHA - HAMMING_BETA * (2.0 * PI * i as f64 / denom).cos())
    }));
    Ok(())
}
