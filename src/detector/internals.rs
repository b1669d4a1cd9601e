use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::{copy_complex_to_real, copy_real_to_complex, modulus_squared};
use crate::utils::buffer::{new_complex_buffer, new_real_buffer};
use crate::utils::preprocess::remove_dc;

/// Signals up to this length are correlated with the O(n^2) sum, longer ones
/// through a zero-padded FFT. Both give the linear (non-circular) correlation.
pub const DIRECT_CORRELATION_LIMIT: usize = 1024;

/// Check the preconditions shared by every estimator.
pub fn validate<T: Float>(signal: &[T], sample_rate: T) -> Result<()> {
    if signal.len() < 3 {
        return Err(Error::SignalTooShort(signal.len()));
    }
    if !sample_rate.is_finite() || sample_rate <= T::zero() {
        return Err(Error::InvalidSampleRate(
            sample_rate.to_f64().unwrap_or(f64::NAN),
        ));
    }
    Ok(())
}

/// Forward FFT of `signal` zero-padded to `size` samples.
pub fn padded_fft<T: Float>(signal: &[T], size: usize) -> Vec<Complex<T>> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(size);

    let mut spectrum = new_complex_buffer(size);
    copy_real_to_complex(signal, &mut spectrum);
    fft.process(&mut spectrum);
    spectrum
}

/// One-sided spectrum of a real signal: bins `0..=n/2`.
pub fn real_spectrum<T: Float>(signal: &[T]) -> Vec<Complex<T>> {
    let mut spectrum = padded_fft(signal, signal.len());
    spectrum.truncate(signal.len() / 2 + 1);
    spectrum
}

pub fn magnitudes<T: Float>(spectrum: &[Complex<T>]) -> Vec<T> {
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Natural log of each magnitude. Empty bins are floored at the smallest
/// positive value so the log stays finite.
pub fn log_magnitudes<T: Float>(magnitudes: &[T]) -> Vec<T> {
    magnitudes
        .iter()
        .map(|&m| m.max(T::min_positive_value()).ln())
        .collect()
}

/// Circular autocorrelation of `signal` zero-padded to `size` samples.
/// rustfft doesn't normalize, so the result is divided by `size` once for the
/// forward/inverse pair.
pub fn circular_autocorrelation<T: Float>(signal: &[T], size: usize) -> Vec<T> {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(size);
    let inv_fft = planner.plan_fft_inverse(size);

    let mut signal_complex = new_complex_buffer(size);
    copy_real_to_complex(signal, &mut signal_complex);
    fft.process(&mut signal_complex);
    modulus_squared(&mut signal_complex);
    inv_fft.process(&mut signal_complex);

    let mut result = new_real_buffer(size);
    copy_complex_to_real(&signal_complex, &mut result);
    let normalization_const = T::one() / T::from_usize(size).unwrap();
    result
        .iter_mut()
        .for_each(|r| *r = *r * normalization_const);
    result
}

/// Linear autocorrelation at lags `0..signal.len()`.
pub fn linear_autocorrelation<T: Float>(signal: &[T]) -> Vec<T> {
    let n = signal.len();
    if n <= DIRECT_CORRELATION_LIMIT {
        return (0..n)
            .map(|lag| {
                signal[..n - lag]
                    .iter()
                    .zip(&signal[lag..])
                    .map(|(a, b)| *a * *b)
                    .sum::<T>()
            })
            .collect();
    }

    // Padding to at least 2n - 1 keeps the circular wrap out of lags 0..n.
    let mut result = circular_autocorrelation(signal, (2 * n - 1).next_power_of_two());
    result.truncate(n);
    result
}

/// Divide `curve` by its maximum so that the largest value becomes 1.
pub fn normalize_by_max<T: Float>(curve: &mut [T]) -> Result<()> {
    let max = curve
        .iter()
        .copied()
        .fold(T::neg_infinity(), |a, b| a.max(b));
    if !(max > T::zero()) {
        return Err(Error::DegenerateSignal(
            "autocorrelation maximum is zero, signal is silent",
        ));
    }
    curve.iter_mut().for_each(|c| *c = *c / max);
    Ok(())
}

/// Autocorrelation through the FFT, as used when dumping the full curve.
///
/// The signal is zero-padded to the next power of two, correlated with itself
/// in the frequency domain, divided by its length and normalized by the
/// maximum. Only the first half of the padded lags is returned. No DC removal
/// is applied, and lags close to the end of the returned curve include
/// circular wrap-around from the padding.
pub fn autocorrelation_fft<T: Float>(signal: &[T]) -> Result<Vec<T>> {
    if signal.is_empty() {
        return Err(Error::SignalTooShort(0));
    }
    let padded = signal.len().next_power_of_two();
    let mut acf = circular_autocorrelation(signal, padded);
    let length = T::from_usize(signal.len()).unwrap();
    acf.iter_mut().for_each(|a| *a = *a / length);
    normalize_by_max(&mut acf)?;
    acf.truncate(padded / 2);

    log::trace!(
        "fft autocorrelation: {} samples padded to {}",
        signal.len(),
        padded
    );
    Ok(acf)
}

/// Autocorrelation as used for pitch estimation: DC removal, then the full
/// correlation of the signal with itself, keeping the non-negative lags.
/// The curve is normalized so that lag 0 is 1.
pub fn autocorrelation_direct<T: Float>(signal: &[T]) -> Result<Vec<T>> {
    if signal.is_empty() {
        return Err(Error::SignalTooShort(0));
    }
    let mut corr = linear_autocorrelation(&remove_dc(signal));
    normalize_by_max(&mut corr)?;
    Ok(corr)
}
