//! Frequency from the peak of the FFT magnitude spectrum.
//!
//! The signal is tapered with a Kaiser window and the bin with the largest
//! magnitude is refined with parabolic interpolation on the log-magnitude
//! spectrum. A Kaiser main lobe is close to a Gaussian, so its logarithm is
//! close to a parabola and the refined peak is very accurate for clean tones
//! (<https://ccrma.stanford.edu/~jos/sasp/Quadratic_Interpolation_Spectral_Peaks.html>).
//!
//! When a harmonic carries more energy than the fundamental, the harmonic is
//! what gets reported.

use crate::detector::internals::{
    log_magnitudes, magnitudes, padded_fft, real_spectrum, validate,
};
use crate::detector::FrequencyEstimator;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::peak::{argmax, parabolic};
use crate::utils::preprocess::Preprocessor;
use crate::utils::window::DEFAULT_KAISER_BETA;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralConfig<T: Float> {
    /// Kaiser window shape parameter.
    pub beta: T,
    pub remove_dc: bool,
}

impl<T: Float> Default for SpectralConfig<T> {
    fn default() -> Self {
        SpectralConfig {
            beta: T::from_f64(DEFAULT_KAISER_BETA).unwrap(),
            remove_dc: true,
        }
    }
}

impl<T: Float> SpectralConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_beta(mut self, beta: T) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_dc_removal(mut self, remove_dc: bool) -> Self {
        self.remove_dc = remove_dc;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeakEstimator<T: Float> {
    config: SpectralConfig<T>,
}

impl<T: Float> Default for SpectralPeakEstimator<T> {
    fn default() -> Self {
        Self::new(SpectralConfig::default())
    }
}

impl<T: Float> SpectralPeakEstimator<T> {
    pub fn new(config: SpectralConfig<T>) -> Self {
        SpectralPeakEstimator { config }
    }

    pub fn config(&self) -> &SpectralConfig<T> {
        &self.config
    }
}

impl<T> FrequencyEstimator<T> for SpectralPeakEstimator<T>
where
    T: Float,
{
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T> {
        validate(signal, sample_rate)?;

        let windowed = Preprocessor::new()
            .with_dc_removal(self.config.remove_dc)
            .with_kaiser(self.config.beta)
            .apply(signal);
        let magnitudes = magnitudes(&real_spectrum(&windowed));

        let peak = argmax(&magnitudes).unwrap_or(0);
        if peak == 0 || peak + 1 >= magnitudes.len() {
            return Err(Error::BoundaryPeak {
                bin: peak,
                len: magnitudes.len(),
            });
        }

        let refined = parabolic(&log_magnitudes(&magnitudes), peak)?;
        log::debug!(
            "spectral peak at bin {}, interpolated to {}",
            peak,
            refined.index
        );

        Ok(sample_rate * refined.index / T::from_usize(signal.len()).unwrap())
    }
}

/// One-sided magnitude spectrum of `signal`, bins `0..=n/2`, without windowing.
pub fn magnitude_spectrum<T: Float>(signal: &[T]) -> Result<Vec<T>> {
    if signal.is_empty() {
        return Err(Error::SignalTooShort(0));
    }
    Ok(magnitudes(&real_spectrum(signal)))
}

/// Full two-sided spectrum as `(frequency, magnitude)` pairs.
///
/// Bins are in FFT order: DC, the positive frequencies, then the negative
/// frequencies from the most negative up to `-sample_rate / n`.
pub fn spectrum_with_frequencies<T: Float>(signal: &[T], sample_rate: T) -> Result<Vec<(T, T)>> {
    if signal.is_empty() {
        return Err(Error::SignalTooShort(0));
    }
    if !sample_rate.is_finite() || sample_rate <= T::zero() {
        return Err(Error::InvalidSampleRate(
            sample_rate.to_f64().unwrap_or(f64::NAN),
        ));
    }

    let n = signal.len();
    let bin_width = sample_rate / T::from_usize(n).unwrap();
    let positive_bins = (n - 1) / 2 + 1;

    Ok(padded_fft(signal, n)
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let freq = if k < positive_bins {
                T::from_usize(k).unwrap() * bin_width
            } else {
                -T::from_usize(n - k).unwrap() * bin_width
            };
            (freq, c.norm())
        })
        .collect())
}
