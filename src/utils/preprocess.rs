//! Signal conditioning shared by the spectral estimators.

use crate::float::Float;
use crate::utils::buffer::mean;
use crate::utils::window::{apply_window, kaiser_window, DEFAULT_KAISER_BETA};

/// Return a copy of `signal` with its arithmetic mean subtracted.
pub fn remove_dc<T: Float>(signal: &[T]) -> Vec<T> {
    let offset = mean(signal);
    signal.iter().map(|&s| s - offset).collect()
}

/// DC removal followed by an optional Kaiser window.
///
/// ```
/// use freq_estimation::utils::preprocess::Preprocessor;
///
/// let signal = [1.0, 2.0, 4.0, 2.0, 1.0];
/// let conditioned = Preprocessor::new().without_window().apply(&signal);
/// assert_eq!(conditioned, vec![-1.0, 0.0, 2.0, 0.0, -1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessor<T: Float> {
    pub remove_dc: bool,
    /// Kaiser shape parameter, `None` leaves the signal unwindowed.
    pub kaiser_beta: Option<T>,
}

impl<T: Float> Default for Preprocessor<T> {
    fn default() -> Self {
        Preprocessor {
            remove_dc: true,
            kaiser_beta: Some(T::from_f64(DEFAULT_KAISER_BETA).unwrap()),
        }
    }
}

impl<T: Float> Preprocessor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dc_removal(mut self, remove_dc: bool) -> Self {
        self.remove_dc = remove_dc;
        self
    }

    pub fn with_kaiser(mut self, beta: T) -> Self {
        self.kaiser_beta = Some(beta);
        self
    }

    pub fn without_window(mut self) -> Self {
        self.kaiser_beta = None;
        self
    }

    /// Condition `signal` into a new buffer. The input is left untouched.
    pub fn apply(&self, signal: &[T]) -> Vec<T> {
        let mut output = if self.remove_dc {
            remove_dc(signal)
        } else {
            signal.to_vec()
        };
        if let Some(beta) = self.kaiser_beta {
            let window = kaiser_window(output.len(), beta);
            apply_window(&mut output, &window);
        }
        output
    }
}
