use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Load `input` into the real parts of `output`, zeroing every imaginary part
/// and the tail past `input.len()`.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = *i;
        o.im = T::zero();
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Store the real parts of `input` in `output`, zeroing the tail past
/// `input.len()`.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T]) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .zip(output.iter_mut())
        .for_each(|(i, o)| *o = i.re);
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = T::zero());
}

/// Computes |x|^2 for each complex value x in `arr`. This function
/// modifies `arr` in place and leaves the complex component zero.
pub fn modulus_squared<T: Float>(arr: &mut [Complex<T>]) {
    for s in arr {
        s.re = s.re * s.re + s.im * s.im;
        s.im = T::zero();
    }
}

/// Sum of squares, the signal power the voiced detector gates on.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Arithmetic mean of `arr`. An empty slice has mean zero.
pub fn mean<T: Float>(arr: &[T]) -> T {
    if arr.is_empty() {
        return T::zero();
    }
    arr.iter().copied().sum::<T>() / T::from_usize(arr.len()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_round_trip_zero_fills() {
        let mut complex = new_complex_buffer::<f64>(4);
        copy_real_to_complex(&[1.0, -2.0], &mut complex);
        assert_eq!(complex[1], Complex::new(-2.0, 0.0));
        assert_eq!(complex[3], Complex::zero());

        let mut real = vec![9.0; 5];
        copy_complex_to_real(&complex, &mut real);
        assert_eq!(real, vec![1.0, -2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn modulus_squared_clears_imaginary_part() {
        let mut arr = vec![Complex::new(3.0f32, 4.0), Complex::new(0.0, -2.0)];
        modulus_squared(&mut arr);
        assert_eq!(arr, vec![Complex::new(25.0, 0.0), Complex::new(4.0, 0.0)]);
    }

    #[test]
    fn square_sum_of_values() {
        assert_eq!(square_sum(&[3.0f64, -4.0]), 25.0);
        assert_eq!(square_sum::<f32>(&[]), 0.0);
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        assert_eq!(mean::<f64>(&[]), 0.0);
    }
}
