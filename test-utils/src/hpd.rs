use crate::{MatrixLayout, Real, Result, Scalar};
use num_traits::{Float, Zero};

/// Overwrites the `n x n` matrix `a` with the Hermitian positive definite `B·Bᴴ + n·I`,
/// where `B = a / max|a_ij|`.
///
/// The lower triangle is computed and mirrored, so the result is exactly Hermitian
/// and its diagonal is exactly real. A zero input becomes `n·I`.
pub fn make_hpd<T: Scalar>(n: usize, a: &mut [T], lda: usize) -> Result<()> {
    let layout = MatrixLayout::new(n, n, lda)?;
    layout.check_len(a.len())?;

    let max = a
        .chunks(lda)
        .take(n)
        .flat_map(|col| &col[..n])
        .map(|x| x.modulus())
        .fold(T::Real::zero(), |acc, x| acc.max(x));

    // 按行存 B，内积时两行都连续
    let mut b = vec![T::zero(); n * n];
    if max > T::Real::zero() {
        for (j, col) in a.chunks(lda).take(n).enumerate() {
            for (i, &x) in col[..n].iter().enumerate() {
                b[j + i * n] = x.unscale(max);
            }
        }
    }

    let shift = T::Real::of(n as _);
    for j in 0..n {
        let bj = &b[j * n..][..n];
        for i in j..n {
            let bi = &b[i * n..][..n];
            let mut s = T::zero();
            for (&x, &y) in bi.iter().zip(bj) {
                s += x * y.conj();
            }
            if i == j {
                a[layout.offset(i, i)] = T::from_real(s.re() + shift);
            } else {
                a[layout.offset(i, j)] = s;
                a[layout.offset(j, i)] = s.conj();
            }
        }
    }
    Ok(())
}
