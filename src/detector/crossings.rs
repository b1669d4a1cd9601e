//! Frequency from the spacing of rising zero crossings.
//!
//! Works well for long, low-noise sines, squares and triangles, and gets more
//! accurate as the signal gets longer. It is also the cheapest estimator. The
//! signal is used as given: a baseline shift, noise, or several zero crossings
//! per cycle throw it off.

use std::fmt;
use std::str::FromStr;

use crate::detector::internals::validate;
use crate::detector::FrequencyEstimator;
use crate::error::{Error, Result};
use crate::float::Float;

/// How to place a crossing between the two samples that straddle zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Intersect the line through both samples with zero.
    #[default]
    Linear,
    /// Use the index of the last negative sample.
    None,
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self> {
        match mode {
            "linear" => Ok(Interpolation::Linear),
            "none" => Ok(Interpolation::None),
            _ => Err(Error::UnknownInterpolationMode(mode.to_string())),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolation::Linear => write!(f, "linear"),
            Interpolation::None => write!(f, "none"),
        }
    }
}

/// Positions of every rising edge `signal[i] < 0 <= signal[i + 1]`.
pub fn rising_crossings<T: Float>(signal: &[T], interpolation: Interpolation) -> Vec<T> {
    signal
        .windows(2)
        .enumerate()
        .filter(|(_, win)| win[0] < T::zero() && win[1] >= T::zero())
        .map(|(i, win)| {
            let i = T::from_usize(i).unwrap();
            match interpolation {
                Interpolation::Linear => i - win[0] / (win[1] - win[0]),
                Interpolation::None => i,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroCrossingEstimator {
    interpolation: Interpolation,
}

impl ZeroCrossingEstimator {
    pub fn new(interpolation: Interpolation) -> Self {
        ZeroCrossingEstimator { interpolation }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

impl<T> FrequencyEstimator<T> for ZeroCrossingEstimator
where
    T: Float,
{
    fn frequency(&self, signal: &[T], sample_rate: T) -> Result<T> {
        validate(signal, sample_rate)?;

        let crossings = rising_crossings(signal, self.interpolation);
        if crossings.len() < 2 {
            return Err(Error::InsufficientCrossings(crossings.len()));
        }

        let spacing = crossings
            .windows(2)
            .map(|win| win[1] - win[0])
            .sum::<T>()
            / T::from_usize(crossings.len() - 1).unwrap();
        log::debug!(
            "{} rising crossings, mean spacing {} samples",
            crossings.len(),
            spacing
        );

        Ok(sample_rate / spacing)
    }
}
