//! Frequency estimators and the facade that selects between them.
//!
//! | Method | Strength | Weakness |
//! |---|---|---|
//! | [Zero crossings][crossings] | fastest | baseline drift, noise, several crossings per cycle |
//! | [FFT peak][spectral] | most accurate on clean tones | reports a harmonic that is louder than the fundamental |
//! | [Autocorrelation][autocorrelation] | robust to a dominant harmonic | coarser interpolation |
//! | [Harmonic product spectrum][hps] | tolerates a dominant harmonic | degrades with low-frequency noise |
//! | [Voiced pitch][voiced] | rejects quiet and aperiodic frames, fixes octave errors | limited to a pitch range, C1 to C8 by default |
//!
//! Each method is run on its own. Nothing here combines, votes between, or
//! retries methods: if one fails, the caller picks another or rejects the input.

use std::fmt;
use std::str::FromStr;

use rubato::Sample;

use crate::error::{Error, Result};
use crate::float::Float;

pub mod autocorrelation;
pub mod crossings;
pub mod hps;
pub mod internals;
pub mod spectral;
pub mod voiced;

use autocorrelation::AutocorrelationEstimator;
use crossings::{Interpolation, ZeroCrossingEstimator};
use hps::{HarmonicProductSpectrumEstimator, HpsConfig};
use spectral::{SpectralConfig, SpectralPeakEstimator};
use voiced::VoicedPitchEstimator;

/// Estimate the fundamental frequency, in Hz, of `signal` sampled at
/// `sample_rate` Hz. The signal is borrowed and never modified.
pub trait FrequencyEstimator<T>
where
    T: Float,
{
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T>;
}

/// Frequency from the mean spacing of rising zero crossings. `interpolation`
/// is `"linear"` or `"none"`.
pub fn freq_from_crossings<T: Float>(signal: &[T], sample_rate: T, interpolation: &str) -> Result<T> {
    let interpolation = interpolation.parse::<Interpolation>()?;
    ZeroCrossingEstimator::new(interpolation).frequency(signal, sample_rate)
}

/// Frequency from the interpolated peak of the Kaiser-windowed FFT.
pub fn freq_from_fft<T: Float>(signal: &[T], sample_rate: T) -> Result<T> {
    SpectralPeakEstimator::new(SpectralConfig::default()).frequency(signal, sample_rate)
}

/// Frequency from the first period peak of the autocorrelation.
pub fn freq_from_autocorr<T: Float>(signal: &[T], sample_rate: T) -> Result<T> {
    AutocorrelationEstimator::new().frequency(signal, sample_rate)
}

/// Frequency from the harmonic product spectrum.
pub fn freq_from_hps<T: Float + Sample>(signal: &[T], sample_rate: T) -> Result<T> {
    HarmonicProductSpectrumEstimator::new(HpsConfig::default()).frequency(signal, sample_rate)
}

/// Frequency of a voiced frame, with the default C1 to C8 range and
/// thresholds. Quiet or aperiodic frames give [Error::Unvoiced].
pub fn freq_from_voiced<T: Float>(signal: &[T], sample_rate: T) -> Result<T> {
    VoicedPitchEstimator::default().frequency(signal, sample_rate)
}

/// The available estimation methods, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Crossings(Interpolation),
    Fft,
    Autocorrelation,
    Hps,
    Voiced,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Crossings(Interpolation::Linear),
        Method::Fft,
        Method::Autocorrelation,
        Method::Hps,
        Method::Voiced,
    ];

    /// Run this method with its default configuration.
    pub fn estimate<T: Float + Sample>(self, signal: &[T], sample_rate: T) -> Result<T> {
        log::debug!("estimating frequency of {} samples with {}", signal.len(), self);
        match self {
            Method::Crossings(interpolation) => {
                ZeroCrossingEstimator::new(interpolation).frequency(signal, sample_rate)
            }
            Method::Fft => freq_from_fft(signal, sample_rate),
            Method::Autocorrelation => freq_from_autocorr(signal, sample_rate),
            Method::Hps => freq_from_hps(signal, sample_rate),
            Method::Voiced => freq_from_voiced(signal, sample_rate),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Accepts `crossings` (linear interpolation), `crossings-none`, `fft`,
    /// `autocorr` or `autocorrelation`, `hps`, and `voiced`.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "crossings" | "crossings-linear" => Ok(Method::Crossings(Interpolation::Linear)),
            "crossings-none" => Ok(Method::Crossings(Interpolation::None)),
            "fft" => Ok(Method::Fft),
            "autocorr" | "autocorrelation" => Ok(Method::Autocorrelation),
            "hps" => Ok(Method::Hps),
            "voiced" => Ok(Method::Voiced),
            _ => Err(Error::UnknownMethod(name.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Crossings(interpolation) => write!(f, "crossings-{}", interpolation),
            Method::Fft => write!(f, "fft"),
            Method::Autocorrelation => write!(f, "autocorr"),
            Method::Hps => write!(f, "hps"),
            Method::Voiced => write!(f, "voiced"),
        }
    }
}
