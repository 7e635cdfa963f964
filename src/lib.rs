//! # vocalize
//!
//! Real-time LPC spectral envelope analysis for vowel and formant visual
//! feedback.
//!
//! Each frame of captured or decoded audio is reduced to the smooth spectral
//! envelope of an all-pole vocal-tract model. The envelope is drawn against
//! target formant regions so a speaker can see whether their vowel hits the
//! expected F1/F2 ranges.
//!
//! # Pipeline
//!
//! ```text
//! frame ─▶ window ─▶ autocorrelate ─▶ solve ─▶ evaluate ─▶ to_renderable
//! ```
//!
//! - **Window**: Hamming taper of the raw frame
//! - **Autocorrelate**: biased autocorrelation lags 0..=p
//! - **Solve**: Levinson-Durbin recursion for the coefficients a[0..=p]
//! - **Evaluate**: magnitude of 1/A(e^{jω}) on a display frequency axis
//! - **Render**: normalized points, axis ticks and band highlights
//!
//! # Quick Start
//!
//! ```
//! use vocalize::{AnalysisConfig, Analyzer, BandTable};
//!
//! let config = AnalysisConfig { order: 12, frame_size: 512, ..Default::default() };
//! let mut analyzer = Analyzer::new(config).unwrap();
//! let bands = BandTable::default().get("a").unwrap().bands();
//!
//! let frame: Vec<f64> = (0..512)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 16000.0).sin())
//!     .collect();
//! let analysis = analyzer.analyze(&frame, 16000.0, &bands).unwrap();
//!
//! assert!(analysis.lpc().is_stable());
//! let spec = analysis.render().unwrap();
//! assert_eq!(spec.points.len(), 500);
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the `log` facade: the solver logs its coefficients
//! and residual error at debug level, unstable frames and non-finite envelope
//! bins are logged as warnings. No logger is installed by the library.

// Module declarations
pub mod autocorrelation;
pub mod bands;
pub mod config;
pub mod envelope;
pub mod error;
pub mod lpc;
pub mod pipeline;
pub mod render;
pub mod sound;
pub mod spectrum;
pub mod window;

// WASM bindings (enabled with "wasm" feature)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export main types at crate root for convenient access
//
//   use vocalize::{Analyzer, AnalysisConfig, BandTable};
//
// Less common types stay in their modules:
//   use vocalize::render::{AxisTick, HighlightRegion};

/// Error types for vocalize operations.
pub use error::{Error, Result};

/// Pipeline stages as free functions.
///
/// - `apply_window`: Hamming-window a frame
/// - `autocorrelate`: lags 0..=p of a windowed frame
/// - `solve`: Levinson-Durbin recursion
/// - `lpc`: autocorrelate + solve
/// - `evaluate`: frequency response of the all-pole filter
/// - `to_renderable`: normalized geometry for a drawing surface
pub use autocorrelation::{autocorrelate, Autocorrelation};
pub use envelope::{evaluate, FrequencyResponse, Scale};
pub use lpc::{lpc, solve, LpcResult, Stability};
pub use render::{to_renderable, RenderOptions, RenderSpec};
pub use window::{apply_window, hamming_window};

/// Formant target tables.
pub use bands::{BandTable, FormantBand, FormantTargets};

/// Session configuration and the reusable analysis context.
pub use config::AnalysisConfig;
pub use pipeline::{analyze_frame, Analysis, Analyzer};

/// Decoded audio for playback analysis.
pub use sound::Sound;

/// FFT spectrum overlay.
pub use spectrum::{frame_spectrum, SpectrumAnalyzer};
