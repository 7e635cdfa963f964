//! Sound - decoded audio samples with sample rate.
//!
//! The source of frames in playback-analysis mode: a recording (or a decoded
//! stimulus) that the display loop reads one fixed-size window at a time at
//! the current playback position.
//!
//! # Mono Audio Only
//!
//! Only mono audio is supported. Multi-channel WAV files require explicit
//! channel selection via `from_file_channel()`.
//!
//! # Sample Format
//!
//! Samples are stored as 64-bit floats. Integer WAV formats are normalized to
//! [-1.0, 1.0] by dividing by 2^(bits-1).

use std::io::{Cursor, Read};
use std::path::Path;

use ndarray::{s, Array1};

use crate::bands::FormantBand;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Analysis, Analyzer};

/// Audio samples with sample rate.
#[derive(Debug, Clone)]
pub struct Sound {
    samples: Array1<f64>,
    sample_rate: f64,
}

impl Sound {
    /// Create a Sound from samples and sample rate.
    pub fn new(samples: Array1<f64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a Sound from a slice of samples.
    pub fn from_slice(samples: &[f64], sample_rate: f64) -> Self {
        Self {
            samples: Array1::from_vec(samples.to_vec()),
            sample_rate,
        }
    }

    /// Load audio from a mono WAV file.
    ///
    /// # Errors
    ///
    /// - `Error::NotMono` if the file has more than one channel
    /// - `Error::AudioRead` if the file cannot be read
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let channels = reader.spec().channels;
        if channels != 1 {
            return Err(Error::NotMono(channels));
        }
        let (samples, sample_rate) = read_interleaved(reader)?;
        Ok(Self::new(Array1::from_vec(samples), sample_rate))
    }

    /// Decode a mono WAV file held in memory (e.g. fetched by a browser).
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let channels = reader.spec().channels;
        if channels != 1 {
            return Err(Error::NotMono(channels));
        }
        let (samples, sample_rate) = read_interleaved(reader)?;
        Ok(Self::new(Array1::from_vec(samples), sample_rate))
    }

    /// Load one channel of a WAV file.
    ///
    /// WAV files store interleaved samples ([L0, R0, L1, R1, ...]); this
    /// keeps every Nth sample starting at `channel`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidParameter` if the channel index is out of range
    /// - `Error::AudioRead` if the file cannot be read
    pub fn from_file_channel<P: AsRef<Path>>(path: P, channel: usize) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let n_channels = reader.spec().channels as usize;
        if channel >= n_channels {
            return Err(Error::InvalidParameter(format!(
                "Channel {} does not exist. File has {} channels.",
                channel, n_channels
            )));
        }

        let (all_samples, sample_rate) = read_interleaved(reader)?;
        let samples: Vec<f64> = all_samples
            .iter()
            .skip(channel)
            .step_by(n_channels)
            .copied()
            .collect();

        Ok(Self::new(Array1::from_vec(samples), sample_rate))
    }

    /// Get the audio samples.
    #[inline]
    pub fn samples(&self) -> &Array1<f64> {
        &self.samples
    }

    /// Get the sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Get the number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Get the total duration in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.n_samples() as f64 / self.sample_rate
    }

    /// Extract the analysis window starting at a playback position.
    ///
    /// The window starts at the sample nearest to `position` (seconds). A
    /// window that runs past the end is zero-padded to `frame_size`.
    ///
    /// Returns `None` once the position is at or beyond the end of the
    /// sound (or negative), which is the signal for a playback loop to stop.
    pub fn frame_at(&self, position: f64, frame_size: usize) -> Option<Vec<f64>> {
        if position.is_nan() || position < 0.0 {
            return None;
        }
        let start = (position * self.sample_rate).round() as usize;
        if start >= self.n_samples() {
            return None;
        }

        let end = (start + frame_size).min(self.n_samples());
        let mut frame = self.samples.slice(s![start..end]).to_vec();
        frame.resize(frame_size, 0.0);
        Some(frame)
    }

    /// Iterate over complete frames spaced `hop` samples apart.
    ///
    /// Each item is (start time in seconds, frame). Iteration ends at the
    /// last frame that fits entirely inside the sound. A `hop` of 0 is
    /// treated as 1.
    pub fn frames(&self, frame_size: usize, hop: usize) -> Frames<'_> {
        Frames {
            sound: self,
            frame_size,
            hop: hop.max(1),
            next_start: 0,
        }
    }

    // ========== Analysis Methods ==========

    /// Analyze the whole sound frame by frame.
    ///
    /// Frames are `config.frame_size` long and do not overlap, which mirrors
    /// a playback loop stepping one window at a time. Frames that fail to
    /// analyze abort the run with their error.
    ///
    /// # Arguments
    ///
    /// * `config` - Analysis configuration
    /// * `bands` - Formant bands to highlight in every render spec
    pub fn to_envelopes(
        &self,
        config: &AnalysisConfig,
        bands: &[FormantBand],
    ) -> Result<Vec<(f64, Analysis)>> {
        let mut analyzer = Analyzer::new(config.clone())?;
        self.frames(config.frame_size, config.frame_size)
            .map(|(t, frame)| {
                analyzer
                    .analyze(&frame, self.sample_rate, bands)
                    .map(|analysis| (t, analysis))
            })
            .collect()
    }
}

/// Iterator over fixed-size frames of a [`Sound`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    sound: &'a Sound,
    frame_size: usize,
    hop: usize,
    next_start: usize,
}

impl Iterator for Frames<'_> {
    type Item = (f64, Vec<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start;
        let end = start.checked_add(self.frame_size)?;
        if self.frame_size == 0 || end > self.sound.n_samples() {
            return None;
        }
        self.next_start += self.hop;

        let t = start as f64 / self.sound.sample_rate;
        Some((t, self.sound.samples.slice(s![start..end]).to_vec()))
    }
}

/// Decode all samples of a WAV stream to f64.
fn read_interleaved<R: Read>(reader: hound::WavReader<R>) -> Result<(Vec<f64>, f64)> {
    let spec = reader.spec();
    let sample_rate = spec.sample_rate as f64;

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<f64>, _>>()?,
        hound::SampleFormat::Int => {
            // 2^(bits-1), e.g. 32768 for 16-bit audio
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<f64>, _>>()?
        }
    };

    Ok((samples, sample_rate))
}

impl std::fmt::Display for Sound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sound({} samples, {} Hz, {:.3}s)",
            self.n_samples(),
            self.sample_rate,
            self.duration()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Sound {
        Sound::from_slice(&(0..n).map(|i| i as f64).collect::<Vec<_>>(), 1000.0)
    }

    #[test]
    fn test_frame_at_position() {
        let sound = ramp(100);
        let frame = sound.frame_at(0.010, 8).unwrap();
        assert_eq!(frame, vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0]);
    }

    #[test]
    fn test_frame_at_tail_is_zero_padded() {
        let sound = ramp(100);
        let frame = sound.frame_at(0.098, 4).unwrap();
        assert_eq!(frame, vec![98.0, 99.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frame_at_end_stops() {
        let sound = ramp(100);
        assert!(sound.frame_at(0.1, 4).is_none());
        assert!(sound.frame_at(5.0, 4).is_none());
        assert!(sound.frame_at(-0.1, 4).is_none());
        assert!(sound.frame_at(f64::NAN, 4).is_none());
    }

    #[test]
    fn test_frames_iterator() {
        let sound = ramp(10);
        let frames: Vec<_> = sound.frames(4, 3).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].1, vec![3.0, 4.0, 5.0, 6.0]);
        assert!((frames[2].0 - 0.006).abs() < 1e-12);
        assert_eq!(sound.frames(11, 1).count(), 0);
    }

    #[test]
    fn test_wav_round_trip() {
        let path = std::env::temp_dir().join(format!("vocalize-sound-{}.wav", std::process::id()));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        {
            let mut writer = hound::WavWriter::create(&path, spec).unwrap();
            for i in 0..16 {
                writer.write_sample(16384i16).unwrap();
                writer.write_sample(-(i as i16)).unwrap();
            }
            writer.finalize().unwrap();
        }

        assert!(matches!(Sound::from_file(&path), Err(Error::NotMono(2))));
        let left = Sound::from_file_channel(&path, 0).unwrap();
        assert_eq!(left.n_samples(), 16);
        assert_eq!(left.sample_rate(), 8000.0);
        assert!(left.samples().iter().all(|&v| (v - 0.5).abs() < 1e-12));
        assert!(Sound::from_file_channel(&path, 2).is_err());

        let bytes = std::fs::read(&path).unwrap();
        assert!(matches!(Sound::from_wav_bytes(&bytes), Err(Error::NotMono(2))));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_wav_bytes_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for v in [0.25f32, -0.5, 1.0] {
                writer.write_sample(v).unwrap();
            }
            writer.finalize().unwrap();
        }

        let sound = Sound::from_wav_bytes(cursor.get_ref()).unwrap();
        assert_eq!(sound.sample_rate(), 16000.0);
        assert_eq!(sound.samples().to_vec(), vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_to_envelopes_steps_whole_frames() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.3).sin()).collect();
        let sound = Sound::from_slice(&samples, 8000.0);
        let config = AnalysisConfig {
            order: 4,
            frame_size: 256,
            num_points: 32,
            ..Default::default()
        };
        let envelopes = sound.to_envelopes(&config, &[]).unwrap();
        assert_eq!(envelopes.len(), 3);
        assert!((envelopes[1].0 - 0.032).abs() < 1e-12);
        assert!(envelopes.iter().all(|(_, a)| a.lpc().order() == 4));
    }
}
