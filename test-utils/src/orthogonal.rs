use crate::{Real, Scalar};
use num_traits::{Float, Zero};
use rand::Rng;

/// Scratch space for drawing Haar-distributed matrices with orthonormal columns.
///
/// A Gaussian matrix is factored by Householder QR; the explicit thin Q,
/// with each column rotated by the phase of the matching diagonal entry of R,
/// is uniformly distributed over matrices with orthonormal columns.
pub(crate) struct Householder<T: Scalar> {
    a: Vec<T>,
    tau: Vec<T::Real>,
    phase: Vec<T>,
}

impl<T: Scalar> Householder<T> {
    pub fn new() -> Self {
        Self {
            a: Vec::new(),
            tau: Vec::new(),
            phase: Vec::new(),
        }
    }

    /// Writes a `rows x k` matrix with orthonormal columns into `q` (`ld = rows`).
    pub fn random_orthonormal<G: Rng + ?Sized>(
        &mut self,
        rows: usize,
        k: usize,
        q: &mut [T],
        rng: &mut G,
    ) {
        assert!(k <= rows);
        let q = &mut q[..rows * k];

        self.a.clear();
        self.a.extend((0..rows * k).map(|_| T::sample_normal(rng)));
        self.factor(rows, k);

        q.fill(T::zero());
        for j in 0..k {
            q[j + j * rows] = T::one();
        }
        // Q = H_0 H_1 ... H_{k-1} [I; 0]，H_j 只作用于第 j 行及以下
        for j in (0..k).rev() {
            let tau = self.tau[j];
            if tau.is_zero() {
                continue;
            }
            let v = &self.a[j + j * rows..][..rows - j];
            for c in j..k {
                apply_reflector(v, tau, &mut q[j + c * rows..][..rows - j]);
            }
        }
        for (col, &phase) in q.chunks_mut(rows).zip(&self.phase) {
            for x in col {
                *x *= phase;
            }
        }
    }

    /// In-place Householder QR of `self.a` (`rows x k`).
    /// Leaves the reflectors below and on the diagonal, their scales in `tau`
    /// and the phases of R's diagonal in `phase`.
    fn factor(&mut self, rows: usize, k: usize) {
        self.tau.clear();
        self.phase.clear();
        for j in 0..k {
            let (head, tail) = self.a.split_at_mut((j + 1) * rows);
            let x = &mut head[j + j * rows..];

            let norm = x.iter().map(|&x| x.norm_sqr()).sum::<T::Real>().sqrt();
            if norm.is_zero() {
                self.tau.push(T::Real::zero());
                self.phase.push(T::one());
                continue;
            }
            let x0 = x[0];
            let abs0 = x0.modulus();
            let ph = if abs0.is_zero() {
                T::one()
            } else {
                x0.unscale(abs0)
            };
            // R_jj = -ph * |x|, v = x - R_jj e_1
            x[0] = x0 + ph.scale(norm);
            let tau = T::Real::of(2.) / x.iter().map(|&v| v.norm_sqr()).sum::<T::Real>();
            self.tau.push(tau);
            self.phase.push(-ph);

            for col in tail.chunks_mut(rows) {
                apply_reflector(x, tau, &mut col[j..]);
            }
        }
    }
}

/// `y <- (I - tau v v^H) y`
#[inline]
fn apply_reflector<T: Scalar>(v: &[T], tau: T::Real, y: &mut [T]) {
    let mut s = T::zero();
    for (&v, &y) in v.iter().zip(y.iter()) {
        s += v.conj() * y;
    }
    let s = s.scale(tau);
    for (&v, y) in v.iter().zip(y) {
        *y -= v * s;
    }
}
