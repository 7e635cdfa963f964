//! Pipeline - one analysis cycle from raw frame to render spec.
//!
//! ```text
//! frame ─▶ window ─▶ autocorrelate ─▶ solve ─▶ evaluate ─▶ to_renderable
//!                                       │
//!                                       └─▶ (coefficients, residual error)
//! ```
//!
//! [`Analyzer`] is the explicit analysis context of a session: it owns the
//! configuration and scratch buffers that are reused from frame to frame.
//! Reuse never changes results; an [`Analyzer`] returns bit-identical output
//! to the free functions it composes. Calls take `&mut self`, so a single
//! analyzer can only ever process one frame at a time, matching the
//! single-threaded capture or display-refresh driver.
//!
//! # Unstable frames
//!
//! When the recursion reports [`Stability::Unstable`], the frame's envelope is
//! still evaluated (with non-finite bins clamped) so it can be inspected, but
//! no render spec is produced for it: the surface skips or flags the frame
//! instead of drawing a plausible-looking curve from bad coefficients.

use crate::autocorrelation::{autocorrelate_into, Autocorrelation};
use crate::bands::FormantBand;
use crate::config::AnalysisConfig;
use crate::envelope::{evaluate, FrequencyResponse};
use crate::error::{Error, Result};
use crate::lpc::{solve, LpcResult, Stability};
use crate::render::{to_renderable, RenderSpec};
use crate::spectrum::SpectrumAnalyzer;
use crate::window::apply_window_into;

/// Everything produced by one analysis cycle.
#[derive(Debug, Clone)]
pub struct Analysis {
    lpc: LpcResult,
    envelope: FrequencyResponse,
    spectrum: Option<FrequencyResponse>,
    render: Option<RenderSpec>,
}

impl Analysis {
    /// Solver output (coefficients, residual error, stability).
    #[inline]
    pub fn lpc(&self) -> &LpcResult {
        &self.lpc
    }

    /// Evaluated spectral envelope.
    #[inline]
    pub fn envelope(&self) -> &FrequencyResponse {
        &self.envelope
    }

    /// FFT spectrum overlay, when enabled in the configuration.
    #[inline]
    pub fn spectrum(&self) -> Option<&FrequencyResponse> {
        self.spectrum.as_ref()
    }

    /// Render spec, or `None` for an unstable frame.
    #[inline]
    pub fn render(&self) -> Option<&RenderSpec> {
        self.render.as_ref()
    }

    /// Take the render spec out of the analysis.
    pub fn into_render(self) -> Option<RenderSpec> {
        self.render
    }
}

/// Reusable analysis context for a stream of frames.
pub struct Analyzer {
    config: AnalysisConfig,
    windowed: Vec<f64>,
    lags: Vec<f64>,
    spectrum: Option<SpectrumAnalyzer>,
}

impl Analyzer {
    /// Create an analyzer for a validated configuration.
    ///
    /// # Errors
    ///
    /// Any error from [`AnalysisConfig::validate`].
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let spectrum = config
            .overlay
            .then(|| SpectrumAnalyzer::new(config.frame_size));
        Ok(Self {
            windowed: Vec::with_capacity(config.frame_size),
            lags: Vec::with_capacity(config.order + 1),
            spectrum,
            config,
        })
    }

    /// Configuration in effect for the next frame.
    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Change the LPC order between frames (e.g. from a UI control).
    ///
    /// # Errors
    ///
    /// The order is validated against the rest of the configuration; on
    /// error the previous order stays in effect.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        let candidate = AnalysisConfig {
            order,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    /// Run one analysis cycle.
    ///
    /// # Arguments
    ///
    /// * `frame` - Raw samples, exactly `config().frame_size` of them
    /// * `sample_rate` - Sample rate of the frame's source in Hz
    /// * `bands` - Formant bands to highlight
    ///
    /// # Errors
    ///
    /// - `Error::InvalidParameter` if the frame length does not match the
    ///   configured frame size or the sample rate is invalid
    /// - `Error::InvalidOrder` if the order does not fit the frame
    pub fn analyze(
        &mut self,
        frame: &[f64],
        sample_rate: f64,
        bands: &[FormantBand],
    ) -> Result<Analysis> {
        let config = &self.config;
        if frame.len() != config.frame_size {
            return Err(Error::InvalidParameter(format!(
                "expected a frame of {} samples, got {}",
                config.frame_size,
                frame.len()
            )));
        }

        apply_window_into(frame, &mut self.windowed)?;
        autocorrelate_into(&self.windowed, config.order, &mut self.lags)?;

        let r = Autocorrelation::from_lags(std::mem::take(&mut self.lags));
        let solved = solve(&r, config.order);
        self.lags = r.into_vec();
        let lpc = solved?;

        let envelope = evaluate(
            lpc.coefficients(),
            sample_rate,
            config.max_freq,
            config.num_points,
            config.scale,
        )?;

        let spectrum = match self.spectrum.as_mut() {
            Some(analyzer) => Some(analyzer.process(
                &self.windowed,
                sample_rate,
                config.max_freq,
                config.num_points,
            )?),
            None => None,
        };

        let render = match lpc.stability() {
            Stability::Unstable { step, reflection } => {
                log::warn!(
                    "unstable LPC filter at step {} (k = {}), residual error {}; frame not rendered",
                    step,
                    reflection,
                    lpc.residual_error()
                );
                None
            }
            Stability::Stable | Stability::Silent => {
                let spec = to_renderable(&envelope, bands, &config.render_options());
                Some(match &spectrum {
                    Some(overlay) => spec.with_overlay(overlay),
                    None => spec,
                })
            }
        };

        log::trace!(
            "frame analyzed: order {}, stability {:?}, envelope peak {:.1} Hz",
            config.order,
            lpc.stability(),
            envelope.peak_frequency()
        );

        Ok(Analysis {
            lpc,
            envelope,
            spectrum,
            render,
        })
    }
}

/// Analyze a single frame with a throwaway [`Analyzer`].
pub fn analyze_frame(
    frame: &[f64],
    sample_rate: f64,
    config: &AnalysisConfig,
    bands: &[FormantBand],
) -> Result<Analysis> {
    Analyzer::new(config.clone())?.analyze(frame, sample_rate, bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocorrelation::autocorrelate;
    use crate::bands::BandTable;
    use crate::lpc::lpc;
    use crate::window::apply_window;
    use std::f64::consts::PI;

    fn sine(freq: f64, sr: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / sr).sin()).collect()
    }

    fn small_config() -> AnalysisConfig {
        AnalysisConfig {
            order: 8,
            frame_size: 256,
            num_points: 100,
            max_freq: 4000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_analyzer_matches_free_functions() {
        let frame = sine(700.0, 16000.0, 256);
        let mut analyzer = Analyzer::new(small_config()).unwrap();

        let first = analyzer.analyze(&frame, 16000.0, &[]).unwrap();
        let second = analyzer.analyze(&frame, 16000.0, &[]).unwrap();
        let direct = lpc(&apply_window(&frame).unwrap(), 8).unwrap();

        assert_eq!(first.lpc(), &direct);
        assert_eq!(second.lpc(), &direct);
        assert_eq!(first.envelope().values(), second.envelope().values());
    }

    #[test]
    fn test_render_spec_carries_bands() {
        let bands = BandTable::default().get("a").unwrap().bands();
        let frame = sine(650.0, 16000.0, 256);
        let analysis = analyze_frame(&frame, 16000.0, &small_config(), &bands).unwrap();

        let spec = analysis.render().unwrap();
        assert_eq!(spec.points.len(), 100);
        assert_eq!(spec.regions.len(), 2);
        assert_eq!(spec.ticks.len(), 6);
        assert!(spec.overlay.is_none());
    }

    #[test]
    fn test_silent_frame_renders_flat() {
        let analysis = analyze_frame(&[0.0; 256], 16000.0, &small_config(), &[]).unwrap();
        assert!(analysis.lpc().is_silent());
        assert_eq!(analysis.lpc().residual_error(), 0.0);
        let spec = analysis.render().unwrap();
        assert!(spec.points.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_overlay_enabled() {
        let config = AnalysisConfig {
            overlay: true,
            ..small_config()
        };
        let analysis = analyze_frame(&sine(1000.0, 16000.0, 256), 16000.0, &config, &[]).unwrap();
        let spectrum = analysis.spectrum().unwrap();
        assert_eq!(spectrum.n_bins(), 100);
        assert_eq!(analysis.render().unwrap().overlay.as_ref().unwrap().len(), 100);
    }

    #[test]
    fn test_frame_size_mismatch() {
        let mut analyzer = Analyzer::new(small_config()).unwrap();
        assert!(matches!(
            analyzer.analyze(&[0.1; 128], 16000.0, &[]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_set_order() {
        let mut analyzer = Analyzer::new(small_config()).unwrap();
        analyzer.set_order(12).unwrap();
        assert_eq!(analyzer.config().order, 12);
        assert!(analyzer.set_order(0).is_err());
        assert_eq!(analyzer.config().order, 12);

        let frame = sine(500.0, 16000.0, 256);
        let analysis = analyzer.analyze(&frame, 16000.0, &[]).unwrap();
        assert_eq!(analysis.lpc().coefficients().len(), 13);
    }

    #[test]
    fn test_analyzer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Analyzer>();
    }

    #[test]
    fn test_scratch_lags_match_autocorrelation() {
        let frame = sine(300.0, 16000.0, 256);
        let mut analyzer = Analyzer::new(small_config()).unwrap();
        analyzer.analyze(&frame, 16000.0, &[]).unwrap();
        let expected = autocorrelate(&apply_window(&frame).unwrap(), 8).unwrap();
        assert_eq!(analyzer.lags, expected.into_vec());
    }
}
