//! WASM bindings for vocalize.
//!
//! This module exposes the analysis pipeline to web browsers through
//! wasm-bindgen. The page owns audio capture and drawing; Rust owns the
//! numbers in between.
//!
//! # Usage from JavaScript
//!
//! ```javascript
//! import init, { LpcAnalyzer } from './pkg/vocalize.js';
//!
//! await init();
//!
//! // order, frame size, display points, max frequency, dB scale
//! const analyzer = new LpcAnalyzer(20, 2048, canvas.width, 5000, true);
//! analyzer.select_category("a");
//!
//! // In the audio callback (Float64Array of frame-size samples)
//! const frame = analyzer.process(samples, audioContext.sampleRate);
//! if (frame.is_renderable) {
//!     const xs = frame.xs();   // Float64Array in [0, 1)
//!     const ys = frame.ys();   // Float64Array in [0, 1]
//! }
//! ```
//!
//! # Building for WASM
//!
//! ```bash
//! wasm-pack build --target web --features wasm
//! ```

use wasm_bindgen::prelude::*;

use crate::bands::{BandTable, FormantBand};
use crate::config::AnalysisConfig;
use crate::envelope::Scale;
use crate::pipeline::{Analysis, Analyzer};
use crate::sound::Sound as RustSound;

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the WASM module.
///
/// Routes Rust panics to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// ============================================================================
// LpcAnalyzer - one analysis session
// ============================================================================

/// Analysis session holding the configuration, scratch buffers and the
/// currently selected formant targets.
#[wasm_bindgen]
pub struct LpcAnalyzer {
    inner: Analyzer,
    table: BandTable,
    selected: Option<String>,
    bands: Vec<FormantBand>,
}

#[wasm_bindgen]
impl LpcAnalyzer {
    /// Create an analyzer.
    ///
    /// # Arguments
    ///
    /// * `order` - LPC order (1 to 30)
    /// * `frame_size` - Samples per frame (e.g. 2048)
    /// * `num_points` - Curve resolution, usually the canvas width
    /// * `max_freq` - Right edge of the display in Hz (0 = Nyquist)
    /// * `decibel` - dB curve when true, normalized linear magnitude otherwise
    ///
    /// # Errors
    ///
    /// Throws if the parameters do not form a valid configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(
        order: usize,
        frame_size: usize,
        num_points: usize,
        max_freq: f64,
        decibel: bool,
    ) -> Result<LpcAnalyzer, JsError> {
        let config = AnalysisConfig {
            order,
            frame_size,
            num_points,
            max_freq,
            scale: if decibel { Scale::Decibel } else { Scale::Linear },
            ..Default::default()
        };
        Ok(LpcAnalyzer {
            inner: Analyzer::new(config)?,
            table: BandTable::default(),
            selected: None,
            bands: Vec::new(),
        })
    }

    /// Create an analyzer from a JSON configuration object.
    pub fn from_config_json(json: &str) -> Result<LpcAnalyzer, JsError> {
        Ok(LpcAnalyzer {
            inner: Analyzer::new(AnalysisConfig::from_json(json)?)?,
            table: BandTable::default(),
            selected: None,
            bands: Vec::new(),
        })
    }

    /// Current LPC order.
    #[wasm_bindgen(getter)]
    pub fn order(&self) -> usize {
        self.inner.config().order
    }

    /// Change the LPC order for the following frames.
    pub fn set_order(&mut self, order: usize) -> Result<(), JsError> {
        Ok(self.inner.set_order(order)?)
    }

    /// Frame size the analyzer expects from `process`.
    #[wasm_bindgen(getter)]
    pub fn frame_size(&self) -> usize {
        self.inner.config().frame_size
    }

    // ========================================================================
    // Formant targets
    // ========================================================================

    /// Replace the band table with one parsed from JSON.
    ///
    /// The current selection is kept if the new table still has it.
    pub fn load_bands(&mut self, json: &str) -> Result<(), JsError> {
        self.table = BandTable::from_json(json)?;
        match self.selected.take() {
            Some(key) => self.select_category(&key),
            None => Ok(()),
        }
    }

    /// Highlight the targets of a category in every following frame.
    pub fn select_category(&mut self, key: &str) -> Result<(), JsError> {
        match self.table.get(key) {
            Ok(targets) => {
                self.bands = targets.bands().to_vec();
                self.selected = Some(key.to_string());
                Ok(())
            }
            Err(e) => {
                self.bands.clear();
                Err(e.into())
            }
        }
    }

    /// Stop highlighting targets.
    pub fn clear_category(&mut self) {
        self.selected = None;
        self.bands.clear();
    }

    /// Category keys of the loaded band table.
    pub fn categories(&self) -> Vec<String> {
        self.table.categories().map(str::to_string).collect()
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Analyze one frame.
    ///
    /// # Arguments
    ///
    /// * `samples` - Float64Array of exactly `frame_size` samples
    /// * `sample_rate` - Sample rate of the capture in Hz
    pub fn process(&mut self, samples: &[f64], sample_rate: f64) -> Result<RenderFrame, JsError> {
        let analysis = self.inner.analyze(samples, sample_rate, &self.bands)?;
        Ok(RenderFrame { inner: analysis })
    }

    /// Analyze the frame of a decoded recording at a playback position.
    ///
    /// Returns `undefined` once the position is past the end.
    pub fn process_at(
        &mut self,
        sound: &Sound,
        position: f64,
    ) -> Result<Option<RenderFrame>, JsError> {
        let frame = match sound.inner.frame_at(position, self.frame_size()) {
            Some(frame) => frame,
            None => return Ok(None),
        };
        let analysis = self
            .inner
            .analyze(&frame, sound.inner.sample_rate(), &self.bands)?;
        Ok(Some(RenderFrame { inner: analysis }))
    }
}

// ============================================================================
// RenderFrame - result of one analysis cycle
// ============================================================================

/// Result of one analysis cycle, flattened into typed arrays.
///
/// Geometry getters return empty arrays when the frame is not renderable.
#[wasm_bindgen]
pub struct RenderFrame {
    inner: Analysis,
}

#[wasm_bindgen]
impl RenderFrame {
    /// False when the filter was unstable and nothing should be drawn.
    #[wasm_bindgen(getter)]
    pub fn is_renderable(&self) -> bool {
        self.inner.render().is_some()
    }

    /// True when every reflection coefficient had |k| < 1.
    #[wasm_bindgen(getter)]
    pub fn is_stable(&self) -> bool {
        self.inner.lpc().is_stable()
    }

    /// True when the frame was below the silence tolerance.
    #[wasm_bindgen(getter)]
    pub fn is_silent(&self) -> bool {
        self.inner.lpc().is_silent()
    }

    /// Final prediction error power.
    #[wasm_bindgen(getter)]
    pub fn residual_error(&self) -> f64 {
        self.inner.lpc().residual_error()
    }

    /// LPC coefficients a[0..=p] as Float64Array.
    pub fn coefficients(&self) -> Vec<f64> {
        self.inner.lpc().coefficients().to_vec()
    }

    /// Curve x positions as fractions of the width.
    pub fn xs(&self) -> Vec<f64> {
        self.points(|p| p.x)
    }

    /// Curve heights in [0, 1], 1 at the top.
    pub fn ys(&self) -> Vec<f64> {
        self.points(|p| p.y)
    }

    /// Overlay spectrum heights, empty when the overlay is off.
    pub fn overlay_ys(&self) -> Vec<f64> {
        self.inner
            .render()
            .and_then(|spec| spec.overlay.as_ref())
            .map(|points| points.iter().map(|p| p.y).collect())
            .unwrap_or_default()
    }

    /// Tick x positions as fractions of the width.
    pub fn tick_positions(&self) -> Vec<f64> {
        self.inner
            .render()
            .map(|spec| spec.ticks.iter().map(|t| t.x).collect())
            .unwrap_or_default()
    }

    /// Tick labels ("0k", "1k", ...).
    pub fn tick_labels(&self) -> Vec<String> {
        self.inner
            .render()
            .map(|spec| spec.ticks.iter().map(|t| t.label.clone()).collect())
            .unwrap_or_default()
    }

    /// Left edges of the highlighted regions.
    pub fn region_starts(&self) -> Vec<f64> {
        self.inner
            .render()
            .map(|spec| spec.regions.iter().map(|r| r.x_start).collect())
            .unwrap_or_default()
    }

    /// Right edges of the highlighted regions.
    pub fn region_ends(&self) -> Vec<f64> {
        self.inner
            .render()
            .map(|spec| spec.regions.iter().map(|r| r.x_end).collect())
            .unwrap_or_default()
    }

    /// Frequency of the envelope maximum in Hz.
    #[wasm_bindgen(getter)]
    pub fn peak_frequency(&self) -> f64 {
        self.inner.envelope().peak_frequency()
    }

    /// Whole render spec as JSON, or `null` when not renderable.
    pub fn to_json(&self) -> Result<Option<String>, JsError> {
        match self.inner.render() {
            Some(spec) => Ok(Some(spec.to_json()?)),
            None => Ok(None),
        }
    }
}

impl RenderFrame {
    fn points(&self, f: impl Fn(&crate::render::CurvePoint) -> f64) -> Vec<f64> {
        self.inner
            .render()
            .map(|spec| spec.points.iter().map(f).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Sound - decoded recording for playback analysis
// ============================================================================

/// Decoded mono recording.
#[wasm_bindgen]
pub struct Sound {
    inner: RustSound,
}

#[wasm_bindgen]
impl Sound {
    /// Create a Sound from raw samples.
    #[wasm_bindgen(constructor)]
    pub fn new(samples: &[f64], sample_rate: f64) -> Sound {
        Sound {
            inner: RustSound::from_slice(samples, sample_rate),
        }
    }

    /// Create a Sound from mono WAV file bytes.
    pub fn from_wav(wav_bytes: &[u8]) -> Result<Sound, JsError> {
        Ok(Sound {
            inner: RustSound::from_wav_bytes(wav_bytes)?,
        })
    }

    /// Get the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.inner.sample_rate()
    }

    /// Get the duration in seconds.
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }
}
