//! Error types for vocalize.
//!
//! Every failure a single analysis cycle can report is a variant of [`Error`].
//! None of them is fatal to a running session: the next frame is analyzed
//! independently.
//!
//! Two conditions are deliberately *not* errors:
//!
//! - **Silence**: a frame whose energy is below the silence tolerance yields a
//!   defined all-zero result (see [`crate::lpc::Stability::Silent`]).
//! - **Filter instability**: a reflection coefficient with magnitude ≥ 1 is
//!   reported through [`crate::lpc::Stability::Unstable`] so the caller can
//!   flag or skip the frame while still inspecting the coefficients.

use thiserror::Error;

/// Result type alias using vocalize's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during LPC analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested LPC order cannot be estimated from the frame.
    ///
    /// The recursion needs at least `order + 1` samples, so the order must be
    /// strictly smaller than the frame length. Order 0 is rejected as well.
    /// In practice an order of about a tenth of the frame length or less is
    /// recommended.
    #[error("Invalid LPC order {order} for a frame of {frame_len} samples")]
    InvalidOrder {
        /// Order that was requested.
        order: usize,
        /// Number of samples (or autocorrelation lags) available.
        frame_len: usize,
    },

    /// Frame is too short to be windowed.
    ///
    /// The Hamming window divides by `N - 1`, so at least two samples are
    /// required.
    #[error("Frame of {0} samples is too short to window (need at least 2)")]
    FrameTooShort(usize),

    /// Invalid parameter value.
    ///
    /// Returned for a non-positive sample rate, an empty frequency axis, an
    /// out-of-range configuration value and similar caller mistakes.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A formant band failed validation.
    ///
    /// Bands must have finite, non-negative bounds with `low < high`.
    #[error("Invalid formant band: {0}")]
    InvalidBand(String),

    /// The requested phonetic category is not in the band table.
    #[error("Unknown phonetic category: {0}")]
    UnknownCategory(String),

    /// Error reading audio file.
    ///
    /// This wraps errors from the `hound` WAV library.
    #[error("Failed to read audio file: {0}")]
    AudioRead(#[from] hound::Error),

    /// Audio file must be mono.
    ///
    /// The u16 parameter contains the actual number of channels. Use
    /// `Sound::from_file_channel()` to pick a channel explicitly.
    #[error("Audio must be mono (single channel), got {0} channels")]
    NotMono(u16),

    /// Error with I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration or band table JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
