//! One-sided Jacobi SVD, used by tests to recover singular values independently.

use crate::{Real, Scalar};

/// Singular values of the `rows x cols` block of `a`, largest first.
///
/// Complex input goes through the real embedding `[[Re, -Im], [Im, Re]]`,
/// whose singular values are those of `a`, each repeated twice.
pub fn singular_values<T: Scalar>(rows: usize, cols: usize, a: &[T], lda: usize) -> Vec<f64> {
    if T::IS_COMPLEX {
        let (m, n) = (2 * rows, 2 * cols);
        let mut w = vec![0.; m * n];
        for j in 0..cols {
            for i in 0..rows {
                let z = a[i + j * lda];
                let (re, im) = (z.re().as_f64(), z.im().as_f64());
                w[i + j * m] = re;
                w[i + rows + j * m] = im;
                w[i + (j + cols) * m] = -im;
                w[i + rows + (j + cols) * m] = re;
            }
        }
        let all = real_singular_values(m, n, w);
        all.into_iter().step_by(2).collect()
    } else {
        let mut w = vec![0.; rows * cols];
        for j in 0..cols {
            for i in 0..rows {
                w[i + j * rows] = a[i + j * lda].re().as_f64();
            }
        }
        real_singular_values(rows, cols, w)
    }
}

fn real_singular_values(rows: usize, cols: usize, w: Vec<f64>) -> Vec<f64> {
    // 列数不超过行数时才能直接正交化列
    let (m, n, mut w) = if rows >= cols {
        (rows, cols, w)
    } else {
        let mut t = vec![0.; rows * cols];
        for j in 0..cols {
            for i in 0..rows {
                t[j + i * cols] = w[i + j * rows];
            }
        }
        (cols, rows, t)
    };

    let tol = m as f64 * f64::EPSILON;
    for _ in 0..64 {
        let mut rotated = false;
        for p in 0..n {
            for q in p + 1..n {
                let (mut alpha, mut beta, mut gamma) = (0., 0., 0.);
                for i in 0..m {
                    let (x, y) = (w[i + p * m], w[i + q * m]);
                    alpha += x * x;
                    beta += y * y;
                    gamma += x * y;
                }
                if gamma.abs() <= tol * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2. * gamma);
                let t = zeta.signum() / (zeta.abs() + (1. + zeta * zeta).sqrt());
                let c = 1. / (1. + t * t).sqrt();
                let s = c * t;
                for i in 0..m {
                    let (x, y) = (w[i + p * m], w[i + q * m]);
                    w[i + p * m] = c * x - s * y;
                    w[i + q * m] = s * x + c * y;
                }
            }
        }
        if !rotated {
            break;
        }
    }

    let mut sv = w
        .chunks(m)
        .map(|col| col.iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect::<Vec<_>>();
    sv.sort_by(|a, b| b.total_cmp(a));
    sv
}

#[test]
fn test_diagonal() {
    // diag(3, 1, 2) 的奇异值
    let a = [3., 0., 0., 0., 1., 0., 0., 0., 2.];
    assert_eq!(singular_values(3, 3, &a, 3), [3., 2., 1.]);
}

#[test]
fn test_rank_one() {
    // [1 2; 2 4; 3 6] = [1 2 3]ᵀ [1 2]
    let a = [1., 2., 3., 2., 4., 6.];
    let sv = singular_values(3, 2, &a, 3);
    let expect = (14.0f64 * 5.).sqrt();
    assert!((sv[0] - expect).abs() < 1e-12);
    assert!(sv[1].abs() < 1e-12);
}

#[test]
fn test_complex() {
    use crate::Complex64;
    // i·I 的奇异值都是 1
    let a = [
        Complex64::new(0., 1.),
        Complex64::new(0., 0.),
        Complex64::new(0., 0.),
        Complex64::new(0., 1.),
    ];
    let sv = singular_values(2, 2, &a, 2);
    assert_eq!(sv.len(), 2);
    for s in sv {
        assert!((s - 1.).abs() < 1e-15);
    }
}
