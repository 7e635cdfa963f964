//! Spectrum - FFT magnitude spectrum of a windowed frame.
//!
//! Drawn under the LPC envelope, the short-time spectrum shows the individual
//! harmonics the envelope smooths over. It is sampled on the same frequency
//! axis as the envelope so both curves share x coordinates.
//!
//! # Algorithm
//!
//! 1. Zero-pad the windowed frame to the next power of two
//! 2. Forward FFT
//! 3. For each display bin, take the nearest FFT bin (clamped to Nyquist)
//! 4. Convert to dB: `20 log10(|X| + 1e-12)`

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::envelope::{FrequencyResponse, Scale, DB_EPSILON};
use crate::error::{Error, Result};

/// Reusable FFT plan and buffer for one frame size.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
}

impl SpectrumAnalyzer {
    /// Plan an FFT for frames of up to `frame_size` samples.
    pub fn new(frame_size: usize) -> Self {
        let fft_size = frame_size.max(1).next_power_of_two();
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// FFT length in samples.
    #[inline]
    pub fn fft_size(&self) -> usize {
        self.buffer.len()
    }

    /// Compute the dB spectrum of a windowed frame on a display axis.
    ///
    /// # Arguments
    ///
    /// * `windowed` - Windowed frame, at most `fft_size()` samples
    /// * `sample_rate` - Sample rate in Hz
    /// * `max_freq` - Right edge of the axis in Hz; 0 or less means Nyquist
    /// * `num_points` - Number of display bins
    ///
    /// # Errors
    ///
    /// `Error::InvalidParameter` if the frame is longer than the plan, the
    /// sample rate is not positive, or `num_points` is zero.
    pub fn process(
        &mut self,
        windowed: &[f64],
        sample_rate: f64,
        max_freq: f64,
        num_points: usize,
    ) -> Result<FrequencyResponse> {
        let fft_size = self.fft_size();
        if windowed.len() > fft_size {
            return Err(Error::InvalidParameter(format!(
                "frame of {} samples exceeds FFT size {}",
                windowed.len(),
                fft_size
            )));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
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

        for (i, v) in self.buffer.iter_mut().enumerate() {
            let sample = windowed.get(i).copied().unwrap_or(0.0);
            *v = Complex::new(sample, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let df = sample_rate / fft_size as f64;
        let nyquist_bin = fft_size / 2;
        let values = (0..num_points)
            .map(|i| {
                let freq = (i as f64 / num_points as f64) * max_freq;
                let k = ((freq / df).round() as usize).min(nyquist_bin);
                20.0 * (self.buffer[k].norm() + DB_EPSILON).log10()
            })
            .collect();

        Ok(FrequencyResponse::from_values(
            values,
            Scale::Decibel,
            sample_rate,
            max_freq,
        ))
    }
}

/// Compute the dB spectrum of a windowed frame.
///
/// Plans a fresh FFT; use [`SpectrumAnalyzer`] to analyze a stream of frames.
pub fn frame_spectrum(
    windowed: &[f64],
    sample_rate: f64,
    max_freq: f64,
    num_points: usize,
) -> Result<FrequencyResponse> {
    SpectrumAnalyzer::new(windowed.len()).process(windowed, sample_rate, max_freq, num_points)
}
