//! Period detection from the autocorrelation of a signal.
//!
//! The autocorrelation of a periodic signal peaks at lags equal to multiples of
//! its period. Starting from lag 0 the curve first decreases; the first lag where
//! it turns upward again marks the end of the zero-lag lobe. The largest value
//! after that point is taken as the period and refined with parabolic
//! interpolation.
//!
//! This finds the true fundamental even when a harmonic carries more energy, but
//! the interpolation is less precise than the spectral peak, and inharmonic
//! sounds can pull the peak to the wrong lag.

use crate::detector::internals::{autocorrelation_direct, validate};
use crate::detector::FrequencyEstimator;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::peak::{argmax, parabolic, PeakEstimate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutocorrelationEstimator;

impl AutocorrelationEstimator {
    pub fn new() -> Self {
        AutocorrelationEstimator
    }
}

/// Locate the first periodic peak of an autocorrelation curve.
///
/// Returns the interpolated lag and the curve's value there. Fails with
/// [Error::NoValleyFound] when the curve never increases after lag 0.
pub fn first_period_peak<T: Float>(curve: &[T]) -> Result<PeakEstimate<T>> {
    let start = curve
        .windows(2)
        .position(|win| win[1] - win[0] > T::zero())
        .ok_or(Error::NoValleyFound)?;

    // `start` is non-empty because win[1] of the valley lies beyond it.
    let peak = start + argmax(&curve[start..]).ok_or(Error::NoValleyFound)?;
    log::debug!("autocorrelation valley at lag {}, peak at lag {}", start, peak);

    parabolic(curve, peak)
}

impl<T> FrequencyEstimator<T> for AutocorrelationEstimator
where
    T: Float,
{
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T> {
        validate(signal, sample_rate)?;

        let corr = autocorrelation_direct(signal)?;
        let peak = first_period_peak(&corr)?;
        if !(peak.index > T::zero()) {
            return Err(Error::DegenerateSignal("period peak at non-positive lag"));
        }

        Ok(sample_rate / peak.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_peak_after_first_valley() {
        // Decreasing lobe, valley at 3, small bump at 5, true peak at 8.
        let curve: [f64; 11] = [1.0, 0.6, 0.2, -0.3, 0.1, 0.2, 0.0, 0.5, 0.9, 0.4, 0.1];
        let peak = first_period_peak(&curve).unwrap();
        assert!((peak.index - 8.0).abs() < 0.5);
        assert!(peak.value >= 0.9);
    }

    #[test]
    fn monotonic_curve_has_no_valley() {
        let curve = [1.0, 0.8, 0.5, 0.1, -0.2];
        assert_eq!(first_period_peak(&curve), Err(Error::NoValleyFound));
    }

    #[test]
    fn peak_on_last_lag_cannot_be_interpolated() {
        let curve = [1.0, 0.2, 0.4, 0.9];
        assert!(matches!(
            first_period_peak(&curve),
            Err(Error::InvalidIndex { index, len: 4 }) if index == 3.0
        ));
    }

    #[test]
    fn sine_period() {
        let sample_rate = 8000.0;
        let signal: Vec<f64> = (0..800)
            .map(|i| (2.0 * std::f64::consts::PI * 200.0 * i as f64 / sample_rate).sin())
            .collect();
        let freq = AutocorrelationEstimator::new()
            .frequency(&signal, sample_rate)
            .unwrap();
        assert_relative_eq!(freq, 200.0, epsilon = 2.0);
    }

    #[test]
    fn silence_is_degenerate() {
        let silence = vec![0.0f64; 256];
        assert!(matches!(
            AutocorrelationEstimator::new().frequency(&silence, 44100.0),
            Err(Error::DegenerateSignal(_))
        ));
    }
}
