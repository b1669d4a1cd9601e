//! Error types for frequency estimation.
//!
//! Every estimator reports a violated precondition as soon as it is detected.
//! There is no fallback frequency and no partial result.

use thiserror::Error;

/// Result type alias using the crate's [Error] type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Parabolic interpolation needs an integer index with a neighbour on each side.
    #[error("index {index} has no neighbours in a sequence of length {len}")]
    InvalidIndex { index: f64, len: usize },

    #[error("unknown interpolation mode {0:?}, expected \"linear\" or \"none\"")]
    UnknownInterpolationMode(String),

    #[error("unknown estimation method {0:?}")]
    UnknownMethod(String),

    /// At least two rising zero crossings are needed to measure a period.
    #[error("found {0} rising zero crossings, need at least 2")]
    InsufficientCrossings(usize),

    /// The autocorrelation never stops decreasing after lag 0.
    #[error("autocorrelation has no valley after lag 0")]
    NoValleyFound,

    /// The dominant spectral bin is the first or last one.
    #[error("spectral peak at bin {bin} of {len} has no neighbour to interpolate with")]
    BoundaryPeak { bin: usize, len: usize },

    /// Silent or zero-variance input.
    #[error("degenerate signal: {0}")]
    DegenerateSignal(&'static str),

    /// Too quiet, or no periodicity clear enough to call a pitch.
    #[error("no voiced pitch: {0}")]
    Unvoiced(&'static str),

    #[error("signal has {0} samples, need at least 3")]
    SignalTooShort(usize),

    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Wraps failures of the resampler used for spectrum decimation.
    #[error("resampling failed: {0}")]
    Resample(String),
}
