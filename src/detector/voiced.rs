//! Voiced pitch detection for tuner-style frame analysis.
//!
//! The frame is tapered with a Hann window and its circular autocorrelation is
//! searched for the strongest period between `max_freq` and `min_freq` (C8 and
//! C1 by default). Before the search, a frame is rejected if its power is at or
//! below the power threshold. After it, the frame is rejected if the period
//! peak is weaker than the clarity threshold times the lag 0 value.
//!
//! The autocorrelation peak is then checked against the magnitude spectrum of
//! the same frame, and moved an octave (or a twelfth) when the spectrum shows
//! it landed on the wrong harmonic. The final frequency averages the period
//! over every repetition of it that fits in half the frame.

use crate::detector::internals::{circular_autocorrelation, magnitudes, real_spectrum, validate};
use crate::detector::FrequencyEstimator;
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::square_sum;
use crate::utils::notes::{FREQ_C1, FREQ_C8};
use crate::utils::peak::parabolic;
use crate::utils::window::{apply_window, hann_window};

/// Spectral magnitudes below this, relative to a full-scale sine, count as
/// absent when deciding between harmonics.
const MAGNITUDE_FLOOR: f64 = 2.4e-4;

/// Combined magnitude of the first three harmonics below which a frame is
/// unvoiced.
const HARMONIC_ENERGY_FLOOR: f64 = 6.8e-4;

/// Width of the autocorrelation smoothing window, in lags.
const SMOOTHING: usize = 5;

/// Lags searched on each side of a predicted period repetition.
const REPETITION_SPAN: usize = 3;

/// Repetitions averaged when lags are refined.
const REFINED_PERIODS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch<T>
where
    T: Float,
{
    pub frequency: T,
    /// Period peak of the autocorrelation over its lag 0 value.
    pub clarity: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoicedConfig<T: Float> {
    pub min_freq: T,
    pub max_freq: T,
    /// Frames whose sum of squares is at or below this are unvoiced.
    pub power_threshold: T,
    pub clarity_threshold: T,
    pub harmonic_correction: bool,
    /// Parabolic refinement of every autocorrelation peak. Averages over the
    /// first five repetitions only.
    pub refine_lags: bool,
}

impl<T: Float> Default for VoicedConfig<T> {
    fn default() -> Self {
        VoicedConfig {
            min_freq: T::from_f64(FREQ_C1).unwrap(),
            max_freq: T::from_f64(FREQ_C8).unwrap(),
            power_threshold: T::zero(),
            clarity_threshold: T::from_f64(0.5).unwrap(),
            harmonic_correction: true,
            refine_lags: false,
        }
    }
}

impl<T: Float> VoicedConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, min_freq: T, max_freq: T) -> Self {
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self
    }

    pub fn with_power_threshold(mut self, power_threshold: T) -> Self {
        self.power_threshold = power_threshold;
        self
    }

    pub fn with_clarity_threshold(mut self, clarity_threshold: T) -> Self {
        self.clarity_threshold = clarity_threshold;
        self
    }

    pub fn with_harmonic_correction(mut self, harmonic_correction: bool) -> Self {
        self.harmonic_correction = harmonic_correction;
        self
    }

    pub fn with_lag_refinement(mut self, refine_lags: bool) -> Self {
        self.refine_lags = refine_lags;
        self
    }

    fn check(&self) -> Result<()> {
        let positive = |v: T| v.is_finite() && v > T::zero();
        if !positive(self.min_freq) || !positive(self.max_freq) || self.max_freq <= self.min_freq {
            return Err(Error::InvalidParameter(format!(
                "pitch range {}..{} Hz must be positive and increasing",
                self.min_freq, self.max_freq
            )));
        }
        if !self.clarity_threshold.is_finite() || !self.power_threshold.is_finite() {
            return Err(Error::InvalidParameter(
                "voicing thresholds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hann-windowed frame: circular autocorrelation and magnitude spectrum.
struct Frame<T: Float> {
    acf: Vec<T>,
    /// One-sided magnitudes, scaled so a full-scale sine peaks near 1.
    magnitudes: Vec<T>,
    sample_rate: T,
}

impl<T: Float> Frame<T> {
    fn analyze(signal: &[T], sample_rate: T) -> Self {
        let n = signal.len();
        let mut windowed = signal.to_vec();
        apply_window(&mut windowed, &hann_window(n));

        let acf = circular_autocorrelation(&windowed, n);
        let scale = T::from_usize(n).unwrap() / T::from_usize(4).unwrap();
        let magnitudes = magnitudes(&real_spectrum(&windowed))
            .into_iter()
            .map(|m| m / scale)
            .collect();
        Frame {
            acf,
            magnitudes,
            sample_rate,
        }
    }

    /// Lags usable for period repetitions.
    fn half(&self) -> usize {
        self.acf.len() / 2
    }

    /// RMS magnitude of the strongest bin within a quarter tone of `freq`
    /// and its two neighbours. Zero when the bins fall outside the spectrum.
    fn magnitude_around(&self, freq: T) -> T {
        let n = T::from_usize(self.acf.len()).unwrap();
        let bin_of = |ratio: f64| {
            (freq * T::from_f64(ratio).unwrap() / self.sample_rate * n)
                .floor()
                .to_usize()
        };
        let (lo, hi) = match (bin_of(47.0 / 48.0), bin_of(49.0 / 48.0)) {
            (Some(lo), Some(hi)) if lo >= 1 && hi + 1 < self.magnitudes.len() => (lo, hi),
            _ => return T::zero(),
        };

        let power = |bin: usize| self.magnitudes[bin] * self.magnitudes[bin];
        let mut at = lo;
        for bin in lo..=hi {
            if power(bin) > power(at) {
                at = bin;
            }
        }
        if power(at) == T::zero() {
            return T::zero();
        }
        ((power(at - 1) + power(at) + power(at + 1)) / T::from_usize(3).unwrap()).sqrt()
    }

    fn frequency_of_lag(&self, lag: usize, refine: bool) -> Result<T> {
        let lag = if refine {
            parabolic(&self.acf, lag)?.index
        } else {
            T::from_usize(lag).unwrap()
        };
        Ok(self.sample_rate / lag)
    }
}

pub struct VoicedPitchEstimator<T: Float> {
    config: VoicedConfig<T>,
}

impl<T: Float> Default for VoicedPitchEstimator<T> {
    fn default() -> Self {
        VoicedPitchEstimator::new(VoicedConfig::default())
    }
}

impl<T: Float> VoicedPitchEstimator<T> {
    pub fn new(config: VoicedConfig<T>) -> Self {
        VoicedPitchEstimator { config }
    }

    pub fn config(&self) -> &VoicedConfig<T> {
        &self.config
    }

    /// Pitch of a voiced frame, `Ok(None)` for an unvoiced one.
    pub fn get_pitch(&self, signal: &[T], sample_rate: T) -> Result<Option<Pitch<T>>> {
        match self.detect(signal, sample_rate) {
            Ok(pitch) => Ok(Some(pitch)),
            Err(Error::Unvoiced(reason)) => {
                log::debug!("unvoiced frame: {}", reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn detect(&self, signal: &[T], sample_rate: T) -> Result<Pitch<T>> {
        validate(signal, sample_rate)?;
        self.config.check()?;
        if square_sum(signal) <= self.config.power_threshold {
            return Err(Error::Unvoiced("signal power below threshold"));
        }

        let frame = Frame::analyze(signal, sample_rate);
        let (lag, peak) = self.strongest_period(&frame, signal.len())?;
        let clarity = peak / frame.acf[0];
        if !(clarity >= self.config.clarity_threshold) {
            return Err(Error::Unvoiced("period peak below clarity threshold"));
        }

        let f1 = frame.frequency_of_lag(lag, self.config.refine_lags)?;
        let f0 = self.correct_harmonic(&frame, f1)?;
        let frequency = self.average_repetitions(&frame, f0)?;
        log::debug!(
            "voiced: lag {} gives {} Hz, corrected to {} Hz, averaged to {} Hz (clarity {})",
            lag,
            f1,
            f0,
            frequency,
            clarity
        );
        Ok(Pitch { frequency, clarity })
    }

    /// Highest local maximum of the autocorrelation, smoothed by a running
    /// maximum, over the lags of the pitch range.
    fn strongest_period(&self, frame: &Frame<T>, len: usize) -> Result<(usize, T)> {
        let acf = &frame.acf;
        let fs = frame.sample_rate;
        let start = (fs / self.config.max_freq)
            .floor()
            .to_usize()
            .unwrap_or(0)
            .saturating_sub(1)
            .max(1);
        let stop = (fs / self.config.min_freq)
            .floor()
            .to_usize()
            .unwrap_or(usize::MAX)
            .saturating_add(1)
            .min(frame.half().saturating_sub(SMOOTHING + 1));
        if stop <= start {
            return Err(Error::SignalTooShort(len));
        }
        log::trace!("voiced: searching lags {}..{}", start, stop);

        let smoothed = |from: usize| {
            acf[from..from + SMOOTHING]
                .iter()
                .copied()
                .fold(T::neg_infinity(), |a, b| a.max(b))
        };
        let mut value = smoothed(start);
        let mut slope = -T::one();
        let (mut peak_lag, mut peak) = (0, T::zero());
        for lag in start..stop {
            let next = smoothed(lag + 1);
            let next_slope = next - value;
            if next_slope < T::zero() && slope > T::zero() && value > peak {
                peak_lag = lag;
                peak = value;
            }
            if next_slope != T::zero() {
                value = next;
                slope = next_slope;
            }
        }
        if peak_lag == 0 {
            return Err(Error::Unvoiced("autocorrelation has no period peak"));
        }
        Ok((peak_lag, peak))
    }

    /// Move `f1` to the harmonic the spectrum supports: down to `f1 / 3` or
    /// `f1 / 2` when the partials between them are strong, up to `2 f1` or
    /// `3 f1` when that partial dominates alone.
    fn correct_harmonic(&self, frame: &Frame<T>, f1: T) -> Result<T> {
        let c = |v: f64| T::from_f64(v).unwrap();
        let floor = c(MAGNITUDE_FLOOR);
        let (min_freq, max_freq) = (self.config.min_freq, self.config.max_freq);

        let f1mag = frame.magnitude_around(f1);
        if self.config.harmonic_correction && f1mag >= floor {
            let third = f1 / c(3.0);
            if third >= min_freq && frame.magnitude_around(third * c(2.0)) > f1mag * c(3.15) {
                return Ok(third);
            }
            let half = f1 / c(2.0);
            if half >= min_freq && frame.magnitude_around(f1 * c(1.5)) > f1mag {
                return Ok(half);
            }
        }

        let (f2, f3) = (f1 * c(2.0), f1 * c(3.0));
        let (f2mag, f3mag) = (frame.magnitude_around(f2), frame.magnitude_around(f3));
        let mut f0 = f1;
        if self.config.harmonic_correction {
            if f2mag >= floor && f2mag > f1mag * c(1.25) && f3mag < f2mag * c(0.06) && f2 <= max_freq {
                return Ok(f2);
            }
            if f3mag >= floor && f2mag < f3mag * c(0.06) && f3mag > f1mag * c(1.25) && f3 <= max_freq {
                f0 = f3;
            }
        }

        let energy = (f1mag * f1mag + f2mag * f2mag + f3mag * f3mag).sqrt();
        if energy < c(HARMONIC_ENERGY_FLOOR) {
            return Err(Error::Unvoiced("no harmonic energy at the period"));
        }
        Ok(f0)
    }

    /// Average the period over its repetitions in the first half of the
    /// autocorrelation. A repetition whose maximum sits on the edge of its
    /// search span is skipped, or ends the average when lags are refined.
    fn average_repetitions(&self, frame: &Frame<T>, f0: T) -> Result<T> {
        let acf = &frame.acf;
        let fs = frame.sample_rate;
        let last = frame.half().saturating_sub(1);
        let mut periods = (T::from_usize(last).unwrap() * f0 / fs)
            .floor()
            .to_usize()
            .unwrap_or(0);
        if self.config.refine_lags {
            periods = periods.min(REFINED_PERIODS);
        }

        let mut total = f0;
        let mut count = 1;
        let mut previous = fs / f0;
        for period in 2..=periods {
            let mean = total / T::from_usize(count).unwrap();
            let centre = match (T::from_usize(period).unwrap() * fs / mean).floor().to_usize() {
                Some(centre) => centre,
                None => break,
            };
            let start = centre.saturating_sub(REPETITION_SPAN);
            let stop = (centre + REPETITION_SPAN).min(last);
            if start >= stop {
                break;
            }
            let mut at = stop;
            for lag in start..=stop {
                if acf[lag] >= acf[at] {
                    at = lag;
                }
            }

            let interior = at != start && at != stop;
            if self.config.refine_lags {
                if !interior {
                    break;
                }
                let x = parabolic(acf, at)?.index;
                if !(x > previous) {
                    break;
                }
                total = total + fs / (x - previous);
                previous = x;
            } else if interior {
                total = total + T::from_usize(period).unwrap() * fs / T::from_usize(at).unwrap();
            } else {
                continue;
            }
            count += 1;
        }
        log::trace!("voiced: averaged {} of {} repetitions", count, periods.max(1));
        Ok(total / T::from_usize(count).unwrap())
    }
}

impl<T: Float> FrequencyEstimator<T> for VoicedPitchEstimator<T> {
    /// Fails with [Error::Unvoiced] where [VoicedPitchEstimator::get_pitch]
    /// returns `None`.
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T> {
        self.detect(signal, sample_rate).map(|pitch| pitch.frequency)
    }
}
