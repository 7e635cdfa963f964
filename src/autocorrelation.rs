//! Autocorrelation - biased short-time autocorrelation sequence.
//!
//! The autocorrelation of the windowed frame is the input of the
//! Levinson-Durbin recursion. Only the non-negative lags 0..=p are computed;
//! negative lags are implied by symmetry.
//!
//! # Formula
//!
//! ```text
//! R[i] = Σ_{j=0}^{N-1-i} x[j] × x[j+i],   i = 0 .. p
//! ```
//!
//! No mean removal and no normalization by N (biased estimator). R[0] is the
//! total energy of the windowed frame.

use std::ops::Index;

use crate::error::{Error, Result};

/// Autocorrelation lags 0..=order of a windowed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Autocorrelation {
    lags: Vec<f64>,
}

impl Autocorrelation {
    /// Wrap precomputed lags.
    ///
    /// Lag 0 must come first. Used by callers that already hold an
    /// autocorrelation sequence (for instance from a different estimator).
    pub fn from_lags(lags: Vec<f64>) -> Self {
        Self { lags }
    }

    /// Get all lags as a slice.
    #[inline]
    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    /// Highest lag stored (the LPC order this sequence supports).
    #[inline]
    pub fn order(&self) -> usize {
        self.lags.len().saturating_sub(1)
    }

    /// Total energy of the windowed frame (lag 0).
    #[inline]
    pub fn energy(&self) -> f64 {
        self.lags.first().copied().unwrap_or(0.0)
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.lags
    }
}

impl Index<usize> for Autocorrelation {
    type Output = f64;

    fn index(&self, lag: usize) -> &f64 {
        &self.lags[lag]
    }
}

/// Compute autocorrelation lags 0..=order.
///
/// # Errors
///
/// `Error::InvalidOrder` if `order == 0` or `order >= signal.len()`. No
/// partial result is produced.
pub fn autocorrelate(signal: &[f64], order: usize) -> Result<Autocorrelation> {
    let mut lags = Vec::with_capacity(order + 1);
    autocorrelate_into(signal, order, &mut lags)?;
    Ok(Autocorrelation { lags })
}

/// Compute autocorrelation lags into a caller-owned buffer.
///
/// Same contract as [`autocorrelate`]; `out` is cleared first.
pub fn autocorrelate_into(signal: &[f64], order: usize, out: &mut Vec<f64>) -> Result<()> {
    let n = signal.len();
    if order == 0 || order >= n {
        return Err(Error::InvalidOrder {
            order,
            frame_len: n,
        });
    }

    out.clear();
    for lag in 0..=order {
        let sum: f64 = signal[..n - lag]
            .iter()
            .zip(&signal[lag..])
            .map(|(a, b)| a * b)
            .sum();
        out.push(sum);
    }
    Ok(())
}
