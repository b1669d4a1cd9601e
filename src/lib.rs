//! # Frequency Estimation
//! *freq_estimation* estimates the fundamental frequency of a sampled,
//! single-channel signal held in a buffer.
//!
//! # Estimators
//! Each estimator trades speed, accuracy and robustness differently. None of them
//! is best for every signal, and they are never combined automatically.
//!
//!   * [ZeroCrossingEstimator][detector::crossings]: mean spacing of rising zero crossings
//!   * [SpectralPeakEstimator][detector::spectral]: interpolated peak of the windowed FFT
//!   * [AutocorrelationEstimator][detector::autocorrelation]: first period peak of the autocorrelation
//!   * [HarmonicProductSpectrumEstimator][detector::hps]: sum of decimated log spectra
//!   * [VoicedPitchEstimator][detector::voiced]: gated, octave-corrected autocorrelation pitch
//!
//! All of them implement [FrequencyEstimator], and [Method] selects one by name.
//! [utils::notes] converts frequencies to cents above C1 and back.
//!
//! # Examples
//! ```
//! use freq_estimation::{freq_from_fft, Method};
//!
//! fn main() {
//!     const SAMPLE_RATE: f64 = 44100.0;
//!     const SIZE: usize = 4096;
//!
//!     // Signal coming from some source (microphone, generated, etc...)
//!     let freq = 440.0;
//!     let signal: Vec<f64> = (0..SIZE)
//!         .map(|x| (2.0 * std::f64::consts::PI * x as f64 * freq / SAMPLE_RATE).sin())
//!         .collect();
//!
//!     let estimate = freq_from_fft(&signal, SAMPLE_RATE).unwrap();
//!     assert!((estimate - freq).abs() < 1.0);
//!
//!     let method: Method = "autocorr".parse().unwrap();
//!     let estimate = method.estimate(&signal, SAMPLE_RATE).unwrap();
//!     println!("Frequency: {}", estimate);
//! }
//! ```

pub use detector::{
    freq_from_autocorr, freq_from_crossings, freq_from_fft, freq_from_hps, freq_from_voiced,
    FrequencyEstimator, Method,
};
pub use detector::voiced::Pitch;
pub use error::{Error, Result};
pub use utils::peak::PeakEstimate;

pub mod detector;
pub mod error;
pub mod float;
pub mod utils;
