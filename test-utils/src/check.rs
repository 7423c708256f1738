//! Maximum elementwise error between a reference result and a result under test.
//!
//! The metric is `|ref - res| / |ref|` where `|ref|` exceeds the machine epsilon of the
//! real type, and `|ref - res|` elsewhere. It is not symmetric: swapping the operands
//! changes the denominator.

use crate::{ConfigError, MatrixLayout, Real, Result, Scalar, flags::Uplo, layout::check_len};
use num_traits::{Float, Zero};
use std::fmt;

/// Error of one element against its reference. Zero exactly when the two compare equal.
pub fn element_error<T: Scalar>(reference: T, result: T) -> T::Real {
    let two = T::Real::of(2.);
    if reference == result {
        return T::Real::zero();
    }
    let magnitude = reference.modulus();
    let e = if magnitude > T::Real::epsilon() {
        // 先减半，异号的大数相减不会溢出
        let d = (reference.unscale(two) - result.unscale(two)).modulus();
        d / (magnitude / two)
    } else {
        (reference - result).modulus()
    };
    if !e.is_finite() {
        T::Real::max_value()
    } else if e > T::Real::zero() {
        e
    } else {
        // 不相等但差值下溢
        T::Real::min_positive_value()
    }
}

/// Maximum error over `n` elements spaced `inc` apart.
pub fn get_max_error<T: Scalar>(
    reference: &[T],
    result: &[T],
    n: usize,
    inc: usize,
) -> Result<T::Real> {
    if n == 0 {
        return Ok(T::Real::zero());
    }
    if n > 1 && inc == 0 {
        return Err(ConfigError::Stride { stride: 0, span: 1 });
    }
    let required = (n - 1) * inc + 1;
    check_len(reference.len(), required)?;
    check_len(result.len(), required)?;

    Ok(reference
        .iter()
        .step_by(inc.max(1))
        .zip(result.iter().step_by(inc.max(1)))
        .take(n)
        .map(|(&r, &x)| element_error(r, x))
        .fold(T::Real::zero(), |acc, e| acc.max(e)))
}

/// Maximum error over the `m x n` block of two column-major matrices. Padding is ignored.
pub fn get_max_error_matrix<T: Scalar>(
    reference: &[T],
    result: &[T],
    m: usize,
    n: usize,
    lda: usize,
) -> Result<T::Real> {
    max_error_where(reference, result, m, n, lda, |_, _| true)
}

/// Like [`get_max_error_matrix`], restricted to the `uplo` triangle, diagonal included.
pub fn get_max_error_matrix_uplo<T: Scalar>(
    reference: &[T],
    result: &[T],
    m: usize,
    n: usize,
    lda: usize,
    uplo: Uplo,
) -> Result<T::Real> {
    max_error_where(reference, result, m, n, lda, |i, j| uplo.contains(i, j))
}

fn max_error_where<T: Scalar>(
    reference: &[T],
    result: &[T],
    m: usize,
    n: usize,
    lda: usize,
    mask: impl Fn(usize, usize) -> bool,
) -> Result<T::Real> {
    let layout = MatrixLayout::new(m, n, lda)?;
    layout.check_len(reference.len())?;
    layout.check_len(result.len())?;

    let mut max = T::Real::zero();
    for (j, (r, x)) in reference.chunks(lda).zip(result.chunks(lda)).take(n).enumerate() {
        for (i, (&r, &x)) in r[..m].iter().zip(&x[..m]).enumerate() {
            if mask(i, j) {
                max = max.max(element_error(r, x));
            }
        }
    }
    Ok(max)
}

/// Outcome of comparing an error against a tolerance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `Pass` iff `error <= tolerance`. A NaN on either side fails.
    pub fn judge<R: Real>(error: R, tolerance: R) -> Self {
        if error <= tolerance {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[inline]
    pub const fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "ok",
            Self::Fail => "failed",
        })
    }
}
