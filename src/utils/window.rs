//! Kaiser window used to taper a signal before spectral analysis.
//!
//! The window is
//!
//! > w(i) = I0(beta * sqrt(1 - (2i/(n-1) - 1)^2)) / I0(beta)
//!
//! where _I0_ is the zeroth order modified Bessel function of the first kind.
//! Large shape parameters (the estimators default to `beta = 100`) make
//! _I0(beta)_ huge, so both Bessel values are scaled by _exp(-beta)_ and summed
//! in log space before taking the ratio.

use crate::float::Float;

/// Default Kaiser shape parameter for the spectral estimators.
pub const DEFAULT_KAISER_BETA: f64 = 100.0;

const MAX_SERIES_TERMS: usize = 100_000;

/// `I0(x) * exp(-scale)`.
fn scaled_bessel_i0(x: f64, scale: f64) -> f64 {
    let mut sum = (-scale).exp();
    if x == 0.0 {
        return sum;
    }
    let log_half = (x / 2.0).ln();
    let mut log_term = 0.0;
    for k in 1..MAX_SERIES_TERMS {
        let k = k as f64;
        // t_k = t_{k-1} * (x / 2k)^2
        log_term += 2.0 * (log_half - k.ln());
        let term = (log_term - scale).exp();
        sum += term;
        // Terms grow until k ~ x/2, only stop once they are shrinking.
        if k > x / 2.0 && term <= f64::EPSILON * sum {
            break;
        }
    }
    sum
}

/// Symmetric Kaiser window of `size` samples with shape parameter `beta`.
/// A window of a single sample is `[1]`, and of no samples is empty.
pub fn kaiser_window<T: Float>(size: usize, beta: T) -> Vec<T> {
    match size {
        0 => return Vec::new(),
        1 => return vec![T::one()],
        _ => {}
    }
    let beta = beta.to_f64().unwrap_or(DEFAULT_KAISER_BETA).max(0.0);
    let denominator = scaled_bessel_i0(beta, beta);
    let last = (size - 1) as f64;

    (0..size)
        .map(|i| {
            let t = 2.0 * i as f64 / last - 1.0;
            let arg = beta * (1.0 - t * t).max(0.0).sqrt();
            T::from_f64(scaled_bessel_i0(arg, beta) / denominator).unwrap()
        })
        .collect()
}

/// Periodic Hann window, `0.5 - 0.5 cos(2 pi i / n)`. The voiced detector
/// tapers its frame with it before the circular autocorrelation.
pub fn hann_window<T: Float>(size: usize) -> Vec<T> {
    let n = size as f64;
    (0..size)
        .map(|i| {
            let w = 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n).cos();
            T::from_f64(w).unwrap()
        })
        .collect()
}

/// Multiply `signal` by `window` in place.
pub fn apply_window<T: Float>(signal: &mut [T], window: &[T]) {
    assert_eq!(signal.len(), window.len());
    signal
        .iter_mut()
        .zip(window)
        .for_each(|(s, w)| *s = *s * *w);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bessel_matches_reference_values() {
        // I0(1) = 1.2660658777520082, I0(5) = 27.239871823604442
        assert_relative_eq!(scaled_bessel_i0(1.0, 0.0), 1.2660658777520082, epsilon = 1e-12);
        assert_relative_eq!(
            scaled_bessel_i0(5.0, 0.0),
            27.239871823604442,
            max_relative = 1e-12
        );
        assert_relative_eq!(scaled_bessel_i0(0.0, 0.0), 1.0);
    }

    #[test]
    fn window_is_symmetric_and_peaks_at_center() {
        let window: Vec<f64> = kaiser_window(9, 100.0);
        assert_relative_eq!(window[4], 1.0, epsilon = 1e-12);
        for i in 0..4 {
            assert_relative_eq!(window[i], window[8 - i], max_relative = 1e-9);
            assert!(window[i] < window[i + 1]);
        }
        assert!(window[0] > 0.0);
        assert!(window.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn zero_beta_is_rectangular() {
        let window: Vec<f32> = kaiser_window(5, 0.0);
        assert!(window.iter().all(|&w| (w - 1.0).abs() < 1e-6));
    }

    #[test]
    fn matches_scipy_kaiser() {
        // scipy.signal.windows.kaiser(5, 14)
        let expected = [7.72686684e-06, 1.64932188e-01, 1.0, 1.64932188e-01, 7.72686684e-06];
        let window: Vec<f64> = kaiser_window(5, 14.0);
        for (w, e) in window.iter().zip(expected.iter()) {
            assert_relative_eq!(*w, *e, max_relative = 1e-6);
        }
    }

    #[test]
    fn hann_is_periodic() {
        let window: Vec<f64> = hann_window(8);
        assert_relative_eq!(window[0], 0.0);
        assert_relative_eq!(window[4], 1.0);
        assert_relative_eq!(window[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(window[1], window[7], epsilon = 1e-12);
        assert!(hann_window::<f32>(0).is_empty());
    }

    #[test]
    fn degenerate_sizes() {
        assert_eq!(kaiser_window::<f64>(1, 100.0), vec![1.0]);
        assert!(kaiser_window::<f32>(0, 100.0).is_empty());
    }
}
