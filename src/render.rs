//! Render - drawing-surface independent description of an envelope view.
//!
//! This module performs no drawing. It turns a [`FrequencyResponse`] and a set
//! of formant bands into normalized geometry that any surface (a canvas, a
//! plot widget, a terminal) can scale to its own size:
//!
//! - curve points with `x = bin / M` and `y` in [0, 1] (1 = top of the curve),
//! - frequency ticks at regular intervals of the display range,
//! - highlight regions spanning each band on the same x axis.
//!
//! # Vertical normalization
//!
//! - **Decibel** curves use their own range: `y = (v - min) / (max - min)`.
//!   A flat curve has no range and maps to `y = 0`.
//! - **Linear** curves come out of [`crate::envelope::evaluate`] already
//!   divided by their floored running maximum, so they are drawn as is. Only a
//!   curve whose maximum exceeds 1 is rescaled by that maximum. A curve kept
//!   small by [`crate::envelope::LINEAR_FLOOR`] stays small on screen.

use serde::Serialize;

use crate::bands::FormantBand;
use crate::envelope::{FrequencyResponse, Scale};

/// Layout options for [`to_renderable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of intervals on the frequency axis (ticks = intervals + 1).
    pub num_ticks: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { num_ticks: 5 }
    }
}

/// A normalized point on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// A frequency axis tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    /// Position as a fraction of the axis width.
    pub x: f64,
    /// Frequency in Hz.
    pub frequency: f64,
    /// Short label in kHz ("0k", "1k", "2.5k").
    pub label: String,
}

/// A highlighted formant region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighlightRegion {
    /// Band the region was derived from, unchanged.
    pub band: FormantBand,
    /// Left edge as a fraction of the axis width.
    pub x_start: f64,
    /// Right edge as a fraction of the axis width (clamped to 1).
    pub x_end: f64,
}

/// Everything a surface needs to draw one envelope frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpec {
    pub points: Vec<CurvePoint>,
    pub ticks: Vec<AxisTick>,
    pub regions: Vec<HighlightRegion>,
    /// Optional spectrum drawn under the envelope.
    pub overlay: Option<Vec<CurvePoint>>,
    pub scale: Scale,
    /// Frequency at the right edge of the axis in Hz.
    pub max_freq: f64,
}

impl RenderSpec {
    /// Attach a second curve sharing the frequency axis.
    ///
    /// The overlay is normalized with its own range, like the envelope.
    pub fn with_overlay(mut self, overlay: &FrequencyResponse) -> Self {
        self.overlay = Some(curve_points(overlay));
        self
    }

    /// Serialize to JSON for a script-side surface.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build the renderable description of an envelope.
///
/// # Arguments
///
/// * `curve` - Evaluated frequency response
/// * `bands` - Formant bands to highlight, passed through untouched
/// * `options` - Axis layout
pub fn to_renderable(
    curve: &FrequencyResponse,
    bands: &[FormantBand],
    options: &RenderOptions,
) -> RenderSpec {
    let max_freq = curve.max_freq();

    RenderSpec {
        points: curve_points(curve),
        ticks: axis_ticks(max_freq, options.num_ticks),
        regions: bands
            .iter()
            .filter_map(|band| highlight_region(band, max_freq))
            .collect(),
        overlay: None,
        scale: curve.scale(),
        max_freq,
    }
}

fn curve_points(curve: &FrequencyResponse) -> Vec<CurvePoint> {
    let m = curve.n_bins() as f64;
    let (offset, range) = match curve.scale() {
        Scale::Decibel => (curve.min(), curve.max() - curve.min()),
        Scale::Linear => (0.0, curve.max().max(1.0)),
    };

    curve
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let y = if range > 0.0 {
                ((v - offset) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };
            CurvePoint { x: i as f64 / m, y }
        })
        .collect()
}

fn axis_ticks(max_freq: f64, num_ticks: usize) -> Vec<AxisTick> {
    let intervals = num_ticks.max(1);
    (0..=intervals)
        .map(|i| {
            let x = i as f64 / intervals as f64;
            let frequency = x * max_freq;
            AxisTick {
                x,
                frequency,
                label: khz_label(frequency),
            }
        })
        .collect()
}

fn khz_label(freq: f64) -> String {
    let khz = freq / 1000.0;
    if (khz - khz.round()).abs() < 1e-9 {
        format!("{:.0}k", khz)
    } else {
        format!("{:.1}k", khz)
    }
}

fn highlight_region(band: &FormantBand, max_freq: f64) -> Option<HighlightRegion> {
    if max_freq <= 0.0 || band.low() >= max_freq {
        return None;
    }
    Some(HighlightRegion {
        band: *band,
        x_start: (band.low() / max_freq).clamp(0.0, 1.0),
        x_end: (band.high() / max_freq).clamp(0.0, 1.0),
    })
}
