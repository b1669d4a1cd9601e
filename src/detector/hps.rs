//! Harmonic product spectrum.
//!
//! A harmonic sound has energy at integer multiples of its fundamental. Decimating
//! the spectrum by 2, 3, ... moves each of those harmonics onto the fundamental's
//! bin, so summing the decimated copies reinforces the fundamental even when one
//! of its harmonics is louder. The sum is taken over log magnitudes, which is the
//! logarithm of the classic product.
//!
//! Low-frequency noise piles up in every copy and can overwhelm the peak, and a
//! signal without harmonics gains nothing from the extra copies.

use crate::detector::internals::{log_magnitudes, magnitudes, real_spectrum, validate};
use crate::detector::FrequencyEstimator;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::mean;
use crate::utils::decimate::{Decimator, SincDecimator};
use crate::utils::peak::{argmax, parabolic};
use crate::utils::preprocess::remove_dc;
use crate::utils::window::{apply_window, kaiser_window, DEFAULT_KAISER_BETA};

/// Highest harmonic folded onto the fundamental by default.
pub const DEFAULT_MAX_HARMONIC: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpsConfig<T: Float> {
    /// Kaiser window shape parameter. The default main lobe spans about 64
    /// bins, so short signals need a smaller value (around 14 for 4096 samples)
    /// to keep neighbouring harmonics apart.
    pub beta: T,
    /// Decimation factors run from 2 up to and including this value.
    pub max_harmonic: usize,
}

impl<T: Float> Default for HpsConfig<T> {
    fn default() -> Self {
        HpsConfig {
            beta: T::from_f64(DEFAULT_KAISER_BETA).unwrap(),
            max_harmonic: DEFAULT_MAX_HARMONIC,
        }
    }
}

impl<T: Float> HpsConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_beta(mut self, beta: T) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_max_harmonic(mut self, max_harmonic: usize) -> Self {
        self.max_harmonic = max_harmonic;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicProductSpectrumEstimator<T: Float, D = SincDecimator> {
    config: HpsConfig<T>,
    decimator: D,
}

impl<T: Float> Default for HarmonicProductSpectrumEstimator<T, SincDecimator> {
    fn default() -> Self {
        Self::new(HpsConfig::default())
    }
}

impl<T: Float> HarmonicProductSpectrumEstimator<T, SincDecimator> {
    pub fn new(config: HpsConfig<T>) -> Self {
        HarmonicProductSpectrumEstimator {
            config,
            decimator: SincDecimator::default(),
        }
    }
}

impl<T: Float, D> HarmonicProductSpectrumEstimator<T, D> {
    /// Swap the downsampling primitive used to build the decimated copies.
    pub fn with_decimator<E: Decimator<T>>(self, decimator: E) -> HarmonicProductSpectrumEstimator<T, E> {
        HarmonicProductSpectrumEstimator {
            config: self.config,
            decimator,
        }
    }

    pub fn config(&self) -> &HpsConfig<T> {
        &self.config
    }
}

impl<T, D> HarmonicProductSpectrumEstimator<T, D>
where
    T: Float,
    D: Decimator<T>,
{
    /// The summed log spectrum, and the length of its region covered by every
    /// decimated copy.
    pub fn harmonic_sum(&self, signal: &[T]) -> Result<(Vec<T>, usize)> {
        let max_harmonic = self.config.max_harmonic;
        if max_harmonic < 2 {
            return Err(Error::InvalidParameter(format!(
                "max_harmonic must be at least 2, got {}",
                max_harmonic
            )));
        }
        let bins = signal.len() / 2 + 1;
        if bins < 2 * max_harmonic + 1 {
            return Err(Error::InvalidParameter(format!(
                "{} samples are too few to fold {} harmonics",
                signal.len(),
                max_harmonic
            )));
        }

        let mut windowed = remove_dc(signal);
        if windowed.iter().all(|&s| s == T::zero()) {
            return Err(Error::DegenerateSignal(
                "signal is silent, log spectrum is undefined",
            ));
        }
        let window = kaiser_window(windowed.len(), self.config.beta);
        apply_window(&mut windowed, &window);

        let mut spectrum = log_magnitudes(&magnitudes(&real_spectrum(&windowed)));
        // Keep the sum from drifting with the number of copies.
        let offset = mean(&spectrum);
        spectrum.iter_mut().for_each(|x| *x = *x - offset);

        let mut hps = spectrum.clone();
        let mut overlap = hps.len();
        for factor in 2..=max_harmonic {
            let decimated = self.decimator.decimate(&spectrum, factor)?;
            overlap = overlap.min(decimated.len());
            hps.iter_mut()
                .zip(decimated.iter())
                .for_each(|(h, d)| *h = *h + *d);
        }

        Ok((hps, overlap))
    }
}

impl<T, D> FrequencyEstimator<T> for HarmonicProductSpectrumEstimator<T, D>
where
    T: Float,
    D: Decimator<T>,
{
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T> {
        validate(signal, sample_rate)?;

        let (hps, overlap) = self.harmonic_sum(signal)?;
        let peak = argmax(&hps[..overlap]).unwrap_or(0);
        if peak == 0 {
            return Err(Error::BoundaryPeak {
                bin: peak,
                len: overlap,
            });
        }

        let refined = parabolic(&hps, peak)?;
        log::debug!(
            "harmonic product spectrum peak at bin {} of {}, interpolated to {}",
            peak,
            overlap,
            refined.index
        );

        Ok(sample_rate * refined.index / T::from_usize(signal.len()).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Picks every `factor`-th value without filtering.
    struct Stride;

    impl Decimator<f64> for Stride {
        fn decimate(&self, input: &[f64], factor: usize) -> Result<Vec<f64>> {
            Ok(input.iter().step_by(factor).copied().collect())
        }
    }

    fn harmonics(f0: f64, amplitudes: &[f64], sample_rate: f64, size: usize) -> Vec<f64> {
        (0..size)
            .map(|i| {
                let t = i as f64 / sample_rate;
                amplitudes
                    .iter()
                    .enumerate()
                    .map(|(k, a)| a * (2.0 * std::f64::consts::PI * f0 * (k + 1) as f64 * t).sin())
                    .sum::<f64>()
            })
            .collect()
    }

    #[test]
    fn rejects_bad_harmonic_bound() {
        let signal = harmonics(100.0, &[1.0], 8000.0, 4096);
        let estimator = HarmonicProductSpectrumEstimator::new(HpsConfig::new().with_max_harmonic(1));
        assert!(matches!(
            estimator.frequency(&signal, 8000.0),
            Err(Error::InvalidParameter(_))
        ));
        let estimator = HarmonicProductSpectrumEstimator::new(HpsConfig::new());
        assert!(matches!(
            estimator.frequency(&signal[..20], 8000.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn silence_is_degenerate() {
        let silence = vec![0.5f64; 4096];
        assert!(matches!(
            HarmonicProductSpectrumEstimator::new(HpsConfig::new()).frequency(&silence, 8000.0),
            Err(Error::DegenerateSignal(_))
        ));
    }

    #[test]
    fn overlap_is_shortest_copy() {
        let signal = harmonics(200.0, &[1.0, 0.5], 8000.0, 1000);
        let estimator = HarmonicProductSpectrumEstimator::new(HpsConfig::new().with_max_harmonic(4))
            .with_decimator(Stride);
        let (hps, overlap) = estimator.harmonic_sum(&signal).unwrap();
        assert_eq!(hps.len(), 501);
        assert_eq!(overlap, 126);
    }

    #[test]
    fn short_signal_with_sinc_decimator() {
        let sample_rate = 44100.0;
        let estimator = HarmonicProductSpectrumEstimator::new(HpsConfig::new().with_beta(14.0));
        for f0 in [220.0, 440.0, 880.0] {
            let signal = harmonics(f0, &[0.4, 1.0, 0.5, 0.3, 0.2, 0.1], sample_rate, 4096);
            let freq = estimator.frequency(&signal, sample_rate).unwrap();
            // Bins are 10.8 Hz wide.
            assert!((freq - f0).abs() < 5.0, "estimated {} for {}", freq, f0);
        }
    }

    #[test]
    fn stronger_second_harmonic_with_plain_stride() {
        let sample_rate = 8000.0;
        let signal = harmonics(250.0, &[0.4, 1.0, 0.5, 0.3], sample_rate, 8000);
        let freq = HarmonicProductSpectrumEstimator::new(HpsConfig::new().with_max_harmonic(4))
            .with_decimator(Stride)
            .frequency(&signal, sample_rate)
            .unwrap();
        assert!((freq - 250.0).abs() < 2.0, "estimated {}", freq);
    }
}
