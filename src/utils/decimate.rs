//! Integer-factor decimation with anti-aliasing.
//!
//! The harmonic product spectrum needs low-pass filtered, downsampled copies of a
//! spectrum. Filtering is not done here: [SincDecimator] hands the work to the
//! band-limited sinc resampler from `rubato`.
//!
//! The resampler does not sample the input at `j * factor`: its output frames are
//! shifted by a filter delay and a sub-frame phase. A low-pass filter passes a
//! linear ramp unchanged, so decimating a ramp reads that shift off directly as
//! the input position each output frame lands on. The input is then padded with
//! zeros and leading output frames are skipped, which puts bin `j` of the result
//! on bin `j * factor` of the input to within half an input sample.

use rubato::{
    Resampler, Sample, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

use crate::error::{Error, Result};
use crate::float::Float;

/// Low-pass filter and downsample a sequence by an integer factor.
///
/// Implementations must return `ceil(input.len() / factor)` values, with output
/// `j` corresponding to input `j * factor`.
pub trait Decimator<T: Float> {
    fn decimate(&self, input: &[T], factor: usize) -> Result<Vec<T>>;
}

/// [Decimator] backed by `rubato`'s `SincFixedIn` resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SincDecimator {
    /// Minimum sinc length. It is rounded up per factor so that half the
    /// filter spans a whole number of output frames.
    pub sinc_len: usize,
    pub oversampling_factor: usize,
}

impl Default for SincDecimator {
    fn default() -> Self {
        SincDecimator {
            sinc_len: 256,
            oversampling_factor: 160,
        }
    }
}

impl SincDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    fn parameters(&self, factor: usize) -> SincInterpolationParameters {
        // rubato wants a multiple of 8, the alignment wants a multiple of 2 * factor.
        let step = lcm(8, 2 * factor);
        SincInterpolationParameters {
            sinc_len: self.sinc_len.div_ceil(step).max(1) * step,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: self.oversampling_factor,
            window: WindowFunction::BlackmanHarris2,
        }
    }

    /// Run `input` through a fresh resampler until at least `frames` outputs exist.
    fn resample<T: Float + Sample>(
        &self,
        input: Vec<T>,
        factor: usize,
        frames: usize,
    ) -> Result<Vec<T>> {
        let mut resampler = SincFixedIn::<T>::new(
            1.0 / factor as f64,
            1.0,
            self.parameters(factor),
            input.len(),
            1,
        )
        .map_err(|err| Error::Resample(err.to_string()))?;

        let waves_in = vec![input];
        let mut output = resampler
            .process(&waves_in, None)
            .map_err(|err| Error::Resample(err.to_string()))?
            .remove(0);

        // Feed silence until the delayed tail of the input has come out. Each
        // call yields about `len / factor` frames.
        let max_flushes = frames * factor / waves_in[0].len().max(1) + 2;
        let mut flushes = 0;
        while output.len() < frames {
            if flushes == max_flushes {
                return Err(Error::Resample(format!(
                    "resampler produced {} of {} frames",
                    output.len(),
                    frames
                )));
            }
            let tail = resampler
                .process_partial(None::<&[Vec<T>]>, None)
                .map_err(|err| Error::Resample(err.to_string()))?;
            output.extend_from_slice(&tail[0]);
            flushes += 1;
        }
        Ok(output)
    }

    /// Signed offset, in input samples, between the position output frame `k`
    /// samples and `k * factor`, rounded to the nearest sample.
    fn phase<T: Float + Sample>(&self, factor: usize) -> Result<isize> {
        let span = self.parameters(factor).sinc_len * factor;
        let centre = 2 * span;
        let ramp: Vec<T> = (0..4 * span)
            .map(|i| T::from_isize(i as isize - centre as isize).unwrap())
            .collect();

        // `centre` is a multiple of `factor`, so frame `centre / factor` would
        // read 0 without any shift.
        let frame = centre / factor;
        let response = self.resample(ramp, factor, frame + 1)?;
        let offset = response[frame].to_f64().unwrap_or(f64::NAN);
        if !offset.is_finite() || offset.abs() >= span as f64 {
            return Err(Error::Resample(format!(
                "could not measure resampler phase for factor {}: offset {}",
                factor, offset
            )));
        }
        Ok(offset.round() as isize)
    }
}

/// Leading zeros to add and output frames to drop so that output `j` lands on
/// input `j * factor`, given the resampler's `phase`.
fn alignment(phase: isize, factor: usize) -> (usize, usize) {
    let factor = factor as isize;
    if phase >= 0 {
        (phase as usize, 0)
    } else {
        let pad = phase.rem_euclid(factor);
        (pad as usize, ((pad - phase) / factor) as usize)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    let (mut x, mut y) = (a, b);
    while y != 0 {
        (x, y) = (y, x % y);
    }
    a / x * b
}

impl<T> Decimator<T> for SincDecimator
where
    T: Float + Sample,
{
    fn decimate(&self, input: &[T], factor: usize) -> Result<Vec<T>> {
        if factor == 0 {
            return Err(Error::InvalidParameter(
                "decimation factor must be at least 1".into(),
            ));
        }
        if factor == 1 || input.is_empty() {
            return Ok(input.to_vec());
        }

        let expected = input.len().div_ceil(factor);
        let phase = self.phase::<T>(factor)?;
        let (pad, skip) = alignment(phase, factor);

        let mut padded = vec![T::zero(); pad];
        padded.extend_from_slice(input);
        let output = self.resample(padded, factor, skip + expected)?;

        log::trace!(
            "decimated {} values by {} (phase {}, padded {}, skipped {})",
            input.len(),
            factor,
            phase,
            pad,
            skip
        );

        Ok(output.into_iter().skip(skip).take(expected).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::peak::argmax;

    #[test]
    fn output_length_is_ceiling_of_ratio() {
        let decimator = SincDecimator::new();
        let input: Vec<f64> = (0..1001).map(|i| (i as f64 * 0.01).sin()).collect();
        for factor in 1..=8 {
            let output = decimator.decimate(&input, factor).unwrap();
            assert_eq!(output.len(), (1001 + factor - 1) / factor);
        }
    }

    #[test]
    fn slow_signal_passes_through_aligned() {
        // A slow sine is well below the new Nyquist frequency for every factor,
        // so the decimated copy should sample the same curve.
        let decimator = SincDecimator::new();
        let input: Vec<f64> = (0..4000)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 1000.0).sin())
            .collect();
        for factor in 2..=8 {
            let output = decimator.decimate(&input, factor).unwrap();
            // Skip the edges where the filter sees the implicit zero padding.
            let margin = 300 / factor;
            for j in margin..output.len() - margin {
                assert!(
                    (output[j] - input[j * factor]).abs() < 0.02,
                    "factor {} bin {}: {} vs {}",
                    factor,
                    j,
                    output[j],
                    input[j * factor]
                );
            }
        }
    }

    #[test]
    fn narrow_peak_keeps_its_bin() {
        // One-sided spectrum length of a 4096-sample signal. 840 is divisible by
        // every factor, so the decimated peak must land exactly on 840 / factor.
        let decimator = SincDecimator::new();
        let input: Vec<f64> = (0..2049)
            .map(|i| (-((i as f64 - 840.0) / 12.0).powi(2) / 2.0).exp())
            .collect();
        for factor in 2..=8 {
            let output = decimator.decimate(&input, factor).unwrap();
            assert_eq!(output.len(), 2049usize.div_ceil(factor));
            assert_eq!(argmax(&output), Some(840 / factor), "factor {}", factor);
            assert!(output[840 / factor] > 0.95, "factor {}", factor);
        }
    }

    #[test]
    fn alignment_pads_or_skips() {
        // Output leads the input: pad, never skip.
        assert_eq!(alignment(1, 2), (1, 0));
        assert_eq!(alignment(0, 8), (0, 0));
        // Output lags: pad up to the next multiple, then skip whole frames.
        assert_eq!(alignment(-128, 2), (0, 64));
        assert_eq!(alignment(-5, 4), (3, 2));
    }

    #[test]
    fn sinc_len_is_rounded_per_factor() {
        let decimator = SincDecimator::new();
        assert_eq!(decimator.parameters(2).sinc_len, 256);
        assert_eq!(decimator.parameters(3).sinc_len, 264);
        assert_eq!(decimator.parameters(5).sinc_len, 280);
        assert_eq!(decimator.parameters(8).sinc_len, 256);
        assert_eq!(lcm(8, 14), 56);
    }

    #[test]
    fn zero_factor_is_rejected() {
        let decimator = SincDecimator::new();
        assert!(matches!(
            decimator.decimate(&[1.0f32, 2.0], 0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
