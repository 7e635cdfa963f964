//! Config - analysis parameters shared by every frame of a session.
//!
//! The configuration is the only state that outlives a single analysis cycle.
//! It is owned by the caller and handed to the [`crate::Analyzer`]
//! explicitly; nothing in the crate keeps it in a global.
//!
//! # Defaults
//!
//! | Field        | Default  | Meaning                                   |
//! |--------------|----------|-------------------------------------------|
//! | `order`      | 20       | LPC order p                               |
//! | `frame_size` | 2048     | Samples per analysis frame N              |
//! | `num_points` | 500      | Frequency axis resolution M               |
//! | `max_freq`   | 5000 Hz  | Right edge of the display axis            |
//! | `scale`      | decibel  | Envelope output scale                     |
//! | `num_ticks`  | 5        | Axis intervals (1 kHz steps at 5 kHz)     |
//! | `overlay`    | false    | Also compute the FFT spectrum overlay     |
//!
//! A typical adult voice is modelled well by orders 10 to 14 at 10 kHz; the
//! higher default gives a smoother looking envelope at 44.1 kHz.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::envelope::Scale;
use crate::error::{Error, Result};
use crate::render::RenderOptions;

/// Largest LPC order accepted by [`AnalysisConfig::validate`].
pub const MAX_ORDER: usize = 30;

/// Parameters of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub order: usize,
    pub frame_size: usize,
    pub num_points: usize,
    /// Display ceiling in Hz; 0 means the Nyquist frequency.
    pub max_freq: f64,
    pub scale: Scale,
    pub num_ticks: usize,
    pub overlay: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            order: 20,
            frame_size: 2048,
            num_points: 500,
            max_freq: 5000.0,
            scale: Scale::Decibel,
            num_ticks: 5,
            overlay: false,
        }
    }
}

impl AnalysisConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidOrder` if the order is 0, above [`MAX_ORDER`], or not
    ///   below the frame size
    /// - `Error::FrameTooShort` if the frame size is below 2
    /// - `Error::InvalidParameter` for an empty axis, a negative or
    ///   non-finite ceiling, or zero ticks
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 2 {
            return Err(Error::FrameTooShort(self.frame_size));
        }
        if self.order == 0 || self.order > MAX_ORDER || self.order >= self.frame_size {
            return Err(Error::InvalidOrder {
                order: self.order,
                frame_len: self.frame_size,
            });
        }
        if self.num_points == 0 {
            return Err(Error::InvalidParameter(
                "num_points must be at least 1".to_string(),
            ));
        }
        if !self.max_freq.is_finite() || self.max_freq < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "max_freq must be finite and non-negative, got {}",
                self.max_freq
            )));
        }
        if self.num_ticks == 0 {
            return Err(Error::InvalidParameter(
                "num_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Axis layout for the renderer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            num_ticks: self.num_ticks,
        }
    }

    /// Time covered by one frame at `sample_rate`, in seconds.
    ///
    /// In live capture this is the callback period the whole pipeline has to
    /// fit into (about 46 ms for 2048 samples at 44.1 kHz).
    pub fn frame_duration(&self, sample_rate: f64) -> f64 {
        self.frame_size as f64 / sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_order_limits() {
        let mut config = AnalysisConfig::default();
        config.order = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidOrder { .. })));
        config.order = MAX_ORDER + 1;
        assert!(matches!(config.validate(), Err(Error::InvalidOrder { .. })));
        config.order = MAX_ORDER;
        assert!(config.validate().is_ok());

        config.frame_size = 16;
        config.order = 16;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidOrder { order: 16, frame_len: 16 })
        ));
    }

    #[test]
    fn test_other_fields() {
        let config = AnalysisConfig { frame_size: 1, order: 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::FrameTooShort(1))));

        let config = AnalysisConfig { num_points: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));

        let config = AnalysisConfig { max_freq: -1.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { num_ticks: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "order": 12, "scale": "linear" }"#).unwrap();
        assert_eq!(config.order, 12);
        assert_eq!(config.scale, Scale::Linear);
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.render_options().num_ticks, 5);

        assert!(AnalysisConfig::from_json(r#"{ "order": 40 }"#).is_err());
        assert!(matches!(
            AnalysisConfig::from_json("{ order: 12 }"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_frame_duration() {
        let config = AnalysisConfig::default();
        let ms = config.frame_duration(44100.0) * 1000.0;
        assert!((ms - 46.44).abs() < 0.01);
    }
}
