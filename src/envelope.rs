//! Envelope - frequency response of the LPC all-pole filter.
//!
//! The spectral envelope is the magnitude of 1/A(e^{jω}) sampled on a
//! caller-chosen frequency axis. The axis resolution is independent of the
//! frame size, so a drawing surface can ask for one point per pixel column.
//!
//! # Evaluation
//!
//! For bin i of M bins spanning `[0, max_freq)`:
//!
//! ```text
//! f   = (i / M) × max_freq
//! ω   = 2π f / sample_rate
//! re  = 1 + Σ_{k≥1} a[k] cos(kω)
//! im  =     Σ_{k≥1} a[k] sin(kω)
//! mag = 1 / sqrt(re² + im²)
//! ```
//!
//! a[0] is not read: the evaluated polynomial is always monic. A silent
//! frame's all-zero coefficients therefore give a flat response.
//!
//! # Output scales
//!
//! - **Linear**: magnitudes divided by the running maximum, which starts at
//!   [`LINEAR_FLOOR`] so an all-small curve never divides by zero.
//! - **Decibel**: `20 log10(mag + 1e-12)`; the epsilon keeps silence finite.
//!
//! # Non-finite bins
//!
//! An unstable filter can make `re² + im²` vanish, giving mag = ∞ (or NaN when
//! the coefficients themselves are NaN). Such bins never reach the curve:
//! they are counted and replaced by the value that normalizes to 0 (0.0 in
//! linear mode, the finite minimum in dB mode).

use std::f64::consts::PI;

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::bands::FormantBand;
use crate::error::{Error, Result};

/// Initial running maximum for linear normalization.
pub const LINEAR_FLOOR: f64 = 1e-4;

/// Added to the magnitude before taking the logarithm.
pub const DB_EPSILON: f64 = 1e-12;

/// Output scale of a frequency response curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Magnitude normalized to the curve maximum.
    Linear,
    /// Magnitude in dB (unnormalized).
    #[default]
    Decibel,
}

/// LPC spectral envelope sampled on a uniform frequency axis.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    /// Curve values, one per bin.
    values: Array1<f64>,
    scale: Scale,
    sample_rate: f64,
    /// Upper edge of the frequency axis in Hz (exclusive).
    max_freq: f64,
    /// Smallest finite value on the curve.
    min: f64,
    /// Largest finite value on the curve.
    max: f64,
    /// Number of bins that were non-finite before substitution.
    non_finite_bins: usize,
}

impl FrequencyResponse {
    /// Create a FrequencyResponse from already evaluated values.
    ///
    /// Non-finite values are substituted the same way [`evaluate`] does.
    pub fn from_values(values: Vec<f64>, scale: Scale, sample_rate: f64, max_freq: f64) -> Self {
        let mut values = values;
        let (min, max, non_finite_bins) = substitute_non_finite(&mut values, scale);
        Self {
            values: Array1::from_vec(values),
            scale,
            sample_rate,
            max_freq,
            min,
            max,
            non_finite_bins,
        }
    }

    /// Curve values.
    #[inline]
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Output scale of the values.
    #[inline]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Sample rate of the analyzed frame in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Upper edge of the frequency axis in Hz.
    #[inline]
    pub fn max_freq(&self) -> f64 {
        self.max_freq
    }

    /// Number of bins (M).
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.values.len()
    }

    /// Smallest value on the curve (after substitution).
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest finite value on the curve.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Bins that were ∞/NaN and got substituted.
    #[inline]
    pub fn non_finite_bins(&self) -> usize {
        self.non_finite_bins
    }

    /// Width of one bin in Hz.
    #[inline]
    pub fn bin_width(&self) -> f64 {
        self.max_freq / self.n_bins() as f64
    }

    /// Frequency of a bin in Hz: (bin / M) × max_freq.
    #[inline]
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_width()
    }

    /// Index of the highest bin (first one on ties).
    pub fn peak_bin(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate() {
            if v > self.values[best] {
                best = i;
            }
        }
        best
    }

    /// Frequency of the highest bin in Hz.
    pub fn peak_frequency(&self) -> f64 {
        self.frequency(self.peak_bin())
    }

    /// Bins that are strict local maxima of the curve.
    ///
    /// A bin is a peak when it rises above its left neighbour and is not
    /// below its right neighbour, so a flat plateau reports its left edge
    /// once. The first and last bins are never peaks.
    pub fn local_peaks(&self) -> Vec<usize> {
        let v = &self.values;
        (1..v.len().saturating_sub(1))
            .filter(|&i| v[i] > v[i - 1] && v[i] >= v[i + 1])
            .collect()
    }

    /// Frequency of the strongest local peak inside a formant band.
    ///
    /// Returns `None` when the envelope shows no resonance in the band, which
    /// is the "formant not hit" case of the training feedback.
    pub fn peak_in_band(&self, band: &FormantBand) -> Option<f64> {
        self.local_peaks()
            .into_iter()
            .map(|i| (self.frequency(i), self.values[i]))
            .filter(|&(f, _)| band.contains(f))
            .fold(None, |best: Option<(f64, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
            .map(|(f, _)| f)
    }
}

/// Replace non-finite values and return (min, max, replaced count).
fn substitute_non_finite(values: &mut [f64], scale: Scale) -> (f64, f64, usize) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut bad = 0;
    for &v in values.iter() {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        } else {
            bad += 1;
        }
    }

    if bad == values.len() {
        values.iter_mut().for_each(|v| *v = 0.0);
        return (0.0, 0.0, bad);
    }

    if bad > 0 {
        let fill = match scale {
            Scale::Linear => 0.0,
            Scale::Decibel => min,
        };
        for v in values.iter_mut().filter(|v| !v.is_finite()) {
            *v = fill;
        }
        min = min.min(fill);
    }

    (min, max, bad)
}

/// Evaluate the magnitude response of 1/A(z) on a uniform frequency axis.
///
/// # Arguments
///
/// * `a` - LPC coefficients (a[0] is ignored and taken as 1)
/// * `sample_rate` - Sample rate of the analyzed frame in Hz
/// * `max_freq` - Upper edge of the axis in Hz; 0 or less means Nyquist
/// * `num_points` - Number of bins M
/// * `scale` - Linear (normalized) or dB output
///
/// # Errors
///
/// `Error::InvalidParameter` if the sample rate is not positive and finite,
/// `max_freq` is not finite, or `num_points` is zero.
pub fn evaluate(
    a: &[f64],
    sample_rate: f64,
    max_freq: f64,
    num_points: usize,
    scale: Scale,
) -> Result<FrequencyResponse> {
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if !max_freq.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "max frequency must be finite, got {}",
            max_freq
        )));
    }
    if num_points == 0 {
        return Err(Error::InvalidParameter(
            "frequency axis needs at least one point".to_string(),
        ));
    }

    let max_freq = if max_freq <= 0.0 {
        sample_rate / 2.0
    } else {
        max_freq
    };

    let mut values = Vec::with_capacity(num_points);
    let mut running_max = LINEAR_FLOOR;

    for i in 0..num_points {
        let freq = (i as f64 / num_points as f64) * max_freq;
        let w = 2.0 * PI * freq / sample_rate;

        let mut denom = Complex64::new(1.0, 0.0);
        for (k, &coef) in a.iter().enumerate().skip(1) {
            denom += Complex64::from_polar(coef, k as f64 * w);
        }
        let mag = 1.0 / denom.norm_sqr().sqrt();

        match scale {
            Scale::Linear => {
                if mag.is_finite() && mag > running_max {
                    running_max = mag;
                }
                values.push(mag);
            }
            Scale::Decibel => values.push(20.0 * (mag + DB_EPSILON).log10()),
        }
    }

    if scale == Scale::Linear {
        for v in values.iter_mut() {
            *v /= running_max;
        }
    }

    let response = FrequencyResponse::from_values(values, scale, sample_rate, max_freq);
    if response.non_finite_bins() > 0 {
        log::warn!(
            "{} of {} envelope bins were not finite and were clamped",
            response.non_finite_bins(),
            num_points
        );
    }
    Ok(response)
}
