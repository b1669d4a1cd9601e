use crate::error::{Error, Result};
use crate::float::Float;

/// Vertex of the parabola fitted through a sample and its two neighbours.
/// `index` is fractional, `value` is the interpolated height at that index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakEstimate<T: Float> {
    pub index: T,
    pub value: T,
}

struct Point<T: Float> {
    x: T,
    y: T,
}

/// Index of the first largest value in `arr`, or `None` when `arr` is empty.
pub fn argmax<T: Float>(arr: &[T]) -> Option<usize> {
    arr.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, T)>, (i, &val)| match best {
            Some((_, peak_val)) if !(val > peak_val) => best,
            _ => Some((i, val)),
        })
        .map(|(i, _)| i)
}

/// Quadratic interpolation of the true position of an inter-sample extremum.
///
/// Returns the vertex of the parabola that goes through `data[x - 1]`, `data[x]`
/// and `data[x + 1]`. Fails with [Error::InvalidIndex] when `x` is the first or
/// last index of `data`, or out of bounds.
///
/// ```
/// use freq_estimation::utils::peak::parabolic;
///
/// let f: [f64; 8] = [2., 3., 1., 6., 4., 2., 3., 1.];
/// let peak = parabolic(&f, 3).unwrap();
/// assert!((peak.index - 3.2142857142857144).abs() < 1e-12);
/// assert!((peak.value - 6.1607142857142856).abs() < 1e-12);
/// ```
pub fn parabolic<T: Float>(data: &[T], x: usize) -> Result<PeakEstimate<T>> {
    if x == 0 || x + 1 >= data.len() {
        return Err(Error::InvalidIndex {
            index: x as f64,
            len: data.len(),
        });
    }

    let center_x = T::from_usize(x).unwrap();
    let point = quadratic_interpolation(
        Point {
            x: center_x - T::one(),
            y: data[x - 1],
        },
        Point {
            x: center_x,
            y: data[x],
        },
        Point {
            x: center_x + T::one(),
            y: data[x + 1],
        },
    );

    Ok(PeakEstimate {
        index: point.x,
        value: point.y,
    })
}

/// Same as [parabolic], for callers holding the index as a float. Fractional,
/// negative and non-finite indices are rejected with [Error::InvalidIndex].
pub fn parabolic_at<T: Float>(data: &[T], x: T) -> Result<PeakEstimate<T>> {
    let invalid = || Error::InvalidIndex {
        index: x.to_f64().unwrap_or(f64::NAN),
        len: data.len(),
    };
    if !x.is_finite() || x < T::zero() || x.fract() != T::zero() {
        return Err(invalid());
    }
    let x = x.to_usize().ok_or_else(invalid)?;
    parabolic(data, x)
}

fn quadratic_interpolation<T: Float>(
    left: Point<T>,
    center: Point<T>,
    right: Point<T>,
) -> Point<T> {
    let curvature = left.y - T::from_f64(2.0).unwrap() * center.y + right.y;
    // Three collinear points have no vertex; keep the center sample.
    if curvature == T::zero() {
        return center;
    }
    let shift = T::from_f64(0.5).unwrap() * (left.y - right.y) / curvature;
    let x = center.x + shift;
    let y = center.y - T::from_f64(0.25).unwrap() * (left.y - right.y) * shift;
    Point { x, y }
}
