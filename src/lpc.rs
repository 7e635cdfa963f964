//! LPC - all-pole filter estimation by Levinson-Durbin recursion.
//!
//! The recursion solves the autocorrelation normal equations order by order,
//! producing the denominator polynomial of the all-pole vocal-tract model:
//!
//! ```text
//! A(z) = a[0] + a[1] z⁻¹ + … + a[p] z⁻ᵖ,   a[0] = 1
//! ```
//!
//! together with the final prediction error power.
//!
//! # Recursion
//!
//! ```text
//! err = R[0]
//! for i in 1..=p:
//!     k    = -(R[i] + Σ_{j=1}^{i-1} a_prev[j] R[i-j]) / err
//!     a[i] = k
//!     a[j] = a_prev[j] + k a_prev[i-j]      (j = 1..i-1)
//!     err *= 1 - k²
//! ```
//!
//! # Degenerate cases
//!
//! - **Silence**: when |R[0]| is below [`SILENCE_TOLERANCE`] the recursion is
//!   skipped and every coefficient, including a[0], is zero with err = 0.
//!   Unlike the normal case the result is not monic, so a silent frame can be
//!   told apart by its coefficients alone.
//! - **Instability**: a reflection coefficient with |k| ≥ 1 makes the filter
//!   unstable and the error can turn negative on later steps. The recursion is
//!   not altered; the condition is reported through [`Stability::Unstable`].

use crate::autocorrelation::{autocorrelate, Autocorrelation};
use crate::error::{Error, Result};

/// Energy below which a frame is treated as silence.
pub const SILENCE_TOLERANCE: f64 = 1e-9;

/// Stability verdict of one recursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    /// Every reflection coefficient satisfied |k| < 1.
    Stable,
    /// Frame energy was below the silence tolerance; coefficients are zero.
    Silent,
    /// The filter is unstable.
    ///
    /// `step` is the first recursion step (1-based) whose reflection
    /// coefficient had |k| ≥ 1 or was not finite. When every |k| was in range
    /// but the final error still came out negative or non-finite, `step` is
    /// the order and `reflection` the last coefficient.
    Unstable {
        /// Recursion step at which instability was detected.
        step: usize,
        /// Offending reflection coefficient.
        reflection: f64,
    },
}

impl Stability {
    /// True for `Stable` and `Silent`.
    #[inline]
    pub fn is_usable(&self) -> bool {
        !matches!(self, Stability::Unstable { .. })
    }
}

/// Result of the Levinson-Durbin recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct LpcResult {
    /// Filter coefficients a[0..=order].
    coefficients: Vec<f64>,
    /// Reflection coefficients k[1..=order] (empty for silence).
    reflection: Vec<f64>,
    /// Final prediction error power.
    residual_error: f64,
    stability: Stability,
}

impl LpcResult {
    /// Zero result for a silent frame.
    fn silent(order: usize) -> Self {
        Self {
            coefficients: vec![0.0; order + 1],
            reflection: Vec::new(),
            residual_error: 0.0,
            stability: Stability::Silent,
        }
    }

    /// Filter coefficients; a[0] = 1 unless the frame was silent.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Reflection coefficient of each recursion step.
    #[inline]
    pub fn reflection(&self) -> &[f64] {
        &self.reflection
    }

    /// Final prediction error power.
    #[inline]
    pub fn residual_error(&self) -> f64 {
        self.residual_error
    }

    /// Stability verdict of the recursion.
    #[inline]
    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// LPC order of the result.
    #[inline]
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// True when the frame was below the silence tolerance.
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.stability == Stability::Silent
    }

    /// True when every reflection coefficient had |k| < 1.
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.stability == Stability::Stable
    }

    /// Split into (coefficients, residual error).
    pub fn into_parts(self) -> (Vec<f64>, f64) {
        (self.coefficients, self.residual_error)
    }
}

/// Solve for LPC coefficients from an autocorrelation sequence.
///
/// # Arguments
///
/// * `r` - Autocorrelation lags, at least `order + 1` of them
/// * `order` - LPC order p
///
/// # Errors
///
/// `Error::InvalidOrder` if `order == 0` or `r` holds fewer than `order + 1`
/// lags.
pub fn solve(r: &Autocorrelation, order: usize) -> Result<LpcResult> {
    let r = r.lags();
    if order == 0 || r.len() < order + 1 {
        return Err(Error::InvalidOrder {
            order,
            frame_len: r.len(),
        });
    }

    if r[0].abs() < SILENCE_TOLERANCE {
        log::debug!("lpc order {}: silent frame (R[0] = {:e})", order, r[0]);
        return Ok(LpcResult::silent(order));
    }

    let mut a = vec![0.0; order + 1];
    let mut a_prev = vec![0.0; order + 1];
    let mut reflection = Vec::with_capacity(order);
    let mut err = r[0];
    let mut unstable: Option<(usize, f64)> = None;

    a[0] = 1.0;

    for i in 1..=order {
        let mut acc = r[i];
        for j in 1..i {
            acc += a_prev[j] * r[i - j];
        }
        let k = -acc / err;

        a[i] = k;
        for j in 1..i {
            a[j] = a_prev[j] + k * a_prev[i - j];
        }

        err *= 1.0 - k * k;

        if unstable.is_none() && (k.is_nan() || k.abs() >= 1.0) {
            unstable = Some((i, k));
        }
        reflection.push(k);

        a_prev[1..=i].copy_from_slice(&a[1..=i]);
    }

    if unstable.is_none() && (err < 0.0 || !err.is_finite()) {
        unstable = Some((order, reflection[order - 1]));
    }

    let stability = match unstable {
        Some((step, k)) => Stability::Unstable { step, reflection: k },
        None => Stability::Stable,
    };

    log::debug!(
        "lpc order {}: err = {:e}, stability = {:?}, a = {:?}",
        order,
        err,
        stability,
        a
    );

    Ok(LpcResult {
        coefficients: a,
        reflection,
        residual_error: err,
        stability,
    })
}

/// Autocorrelate a windowed frame and solve in one step.
///
/// # Errors
///
/// `Error::InvalidOrder` if `order == 0` or `order >= windowed.len()`.
pub fn lpc(windowed: &[f64], order: usize) -> Result<LpcResult> {
    let r = autocorrelate(windowed, order)?;
    solve(&r, order)
}
