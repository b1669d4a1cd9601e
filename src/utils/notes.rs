//! Equal-tempered note helpers. Pitches are measured in cents above C1, so
//! C1 is 0 cents and every semitone adds 100.

use crate::float::Float;

/// A4 concert pitch in Hz.
pub const FREQ_A4: f64 = 440.0;

/// C1 (about 32.70 Hz), the lowest pitch the voiced detector searches for.
pub const FREQ_C1: f64 = 32.703_195_662_574_83;

/// C8 (about 4186.01 Hz), the highest pitch the voiced detector searches for.
pub const FREQ_C8: f64 = 4_186.009_044_809_578;

const CENTS_PER_OCTAVE: f64 = 1200.0;

/// Convert a frequency to cents above C1. Non-positive and non-finite
/// frequencies have no pitch and give `None`.
pub fn freq_to_cent<T: Float>(freq: T) -> Option<T> {
    if !freq.is_finite() || freq <= T::zero() {
        return None;
    }
    let cents = (freq.to_f64()?.log2() - FREQ_C1.log2()) * CENTS_PER_OCTAVE;
    T::from_f64(cents)
}

/// Frequency of a pitch given in cents above C1. Negative cents are below C1.
pub fn cent_to_freq<T: Float>(cent: T) -> T {
    let octaves = cent / T::from_f64(CENTS_PER_OCTAVE).unwrap();
    T::from_f64(FREQ_C1).unwrap() * octaves.exp2()
}

/// The frequency one equal-tempered semitone above `freq`.
pub fn sharp_of<T: Float>(freq: T) -> T {
    freq * T::from_f64(1.0 / 12.0).unwrap().exp2()
}

/// Smallest power-of-two frame whose FFT bins at `sample_rate` are narrower
/// than the semitone step above `base_freq`, so neighbouring notes from
/// `base_freq` up land in different bins.
pub fn frame_size_for<T: Float>(sample_rate: T, base_freq: T) -> Option<usize> {
    let step = sharp_of(base_freq) - base_freq;
    if !(step > T::zero()) || !(sample_rate > T::zero()) {
        return None;
    }
    let bins = (sample_rate / step).to_f64()?;
    if !bins.is_finite() {
        return None;
    }
    Some((bins.ceil() as usize).max(1).next_power_of_two())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn note_constants() {
        let semitones_from_a4 = |n: f64| FREQ_A4 * (n / 12.0).exp2();
        assert_relative_eq!(FREQ_C1, semitones_from_a4(-45.0), max_relative = 1e-12);
        assert_relative_eq!(FREQ_C8, semitones_from_a4(39.0), max_relative = 1e-12);
    }

    #[test]
    fn cents_above_c1() {
        assert_relative_eq!(freq_to_cent(FREQ_C1).unwrap(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(freq_to_cent(FREQ_C8).unwrap(), 8400.0, epsilon = 1e-9);
        // A4 is 4 octaves and 9 semitones above C1.
        assert_relative_eq!(freq_to_cent(440.0f64).unwrap(), 5700.0, epsilon = 1e-9);
        assert_relative_eq!(freq_to_cent(440.0f32).unwrap(), 5700.0, epsilon = 1e-2);
    }

    #[test]
    fn no_pitch_for_non_positive_frequencies() {
        assert_eq!(freq_to_cent(0.0f64), None);
        assert_eq!(freq_to_cent(-440.0f64), None);
        assert_eq!(freq_to_cent(f64::NAN), None);
        assert_eq!(freq_to_cent(f32::INFINITY), None);
    }

    #[test]
    fn cents_to_frequency() {
        assert_relative_eq!(cent_to_freq(5700.0f64), 440.0, max_relative = 1e-12);
        assert_relative_eq!(cent_to_freq(0.0f64), FREQ_C1, max_relative = 1e-12);
        assert_relative_eq!(cent_to_freq(-1200.0f64), FREQ_C1 / 2.0, max_relative = 1e-12);
        for freq in [55.0f64, 261.63, 1000.0, 3999.5] {
            let cents = freq_to_cent(freq).unwrap();
            assert_relative_eq!(cent_to_freq(cents), freq, max_relative = 1e-9);
        }
    }

    #[test]
    fn sharp_is_one_semitone_up() {
        assert_relative_eq!(sharp_of(440.0f64), 466.163_761_518_089_9, max_relative = 1e-12);
        let cents = freq_to_cent(sharp_of(220.0f64)).unwrap() - freq_to_cent(220.0f64).unwrap();
        assert_relative_eq!(cents, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn frame_size_resolves_semitones() {
        // A3 -> A#3 is about 13.1 Hz, 44100 / 13.1 ~ 3371 bins.
        assert_eq!(frame_size_for(44100.0f64, 220.0), Some(4096));
        assert_eq!(frame_size_for(44100.0f64, 440.0), Some(2048));
        assert_eq!(frame_size_for(8000.0f64, 0.0), None);
        assert_eq!(frame_size_for(-1.0f64, 220.0), None);
    }
}
