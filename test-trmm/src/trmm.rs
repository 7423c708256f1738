use test_utils::{
    HostTimeline, Scalar, Timer,
    flags::{Diag, Side, Trans, Uplo},
};

/// Flags of one triangular matrix multiply.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TrmmParams {
    pub side: Side,
    pub uplo: Uplo,
    pub trans: Trans,
    pub diag: Diag,
}

impl TrmmParams {
    /// Order of the triangular operand for an `m x n` right-hand side.
    #[inline]
    pub const fn order(&self, m: usize, n: usize) -> usize {
        match self.side {
            Side::Left => m,
            Side::Right => n,
        }
    }

    /// `op(A)(i, j)`, zero outside the referenced triangle.
    #[inline]
    fn op_a<T: Scalar>(&self, a: &[T], lda: usize, i: usize, j: usize) -> T {
        let (r, c) = match self.trans {
            Trans::NoTrans => (i, j),
            Trans::Trans | Trans::ConjTrans => (j, i),
        };
        if !self.uplo.contains(r, c) {
            T::zero()
        } else if r == c && self.diag == Diag::Unit {
            T::one()
        } else if self.trans == Trans::ConjTrans {
            a[r + c * lda].conj()
        } else {
            a[r + c * lda]
        }
    }

    /// `true` if `op(A)` is lower triangular.
    #[inline]
    fn lower(&self) -> bool {
        (self.uplo == Uplo::Lower) == (self.trans == Trans::NoTrans)
    }
}

/// `B ← alpha·op(A)·B` (left) or `B ← alpha·B·op(A)` (right), in place.
pub trait Trmm<T: Scalar> {
    /// Runs once and returns the milliseconds the multiply itself took.
    #[allow(clippy::too_many_arguments)]
    fn trmm(
        &mut self,
        p: &TrmmParams,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &mut [T],
        ldb: usize,
    ) -> f64;
}

/// Materializes `op(A)` and multiplies densely.
#[derive(Default)]
pub struct Reference;

impl<T: Scalar> Trmm<T> for Reference {
    fn trmm(
        &mut self,
        p: &TrmmParams,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &mut [T],
        ldb: usize,
    ) -> f64 {
        let host = HostTimeline;
        let mut timer = Timer::new(&host);
        timer.tic();

        let k = p.order(m, n);
        let mut op = vec![T::zero(); k * k];
        for j in 0..k {
            for i in 0..k {
                op[i + j * k] = p.op_a(a, lda, i, j);
            }
        }
        let mut c = vec![T::zero(); m * n];
        for j in 0..n {
            for i in 0..m {
                let mut acc = T::zero();
                match p.side {
                    Side::Left => {
                        for l in 0..k {
                            acc += op[i + l * k] * b[l + j * ldb];
                        }
                    }
                    Side::Right => {
                        for l in 0..k {
                            acc += b[i + l * ldb] * op[l + j * k];
                        }
                    }
                }
                c[i + j * m] = alpha * acc;
            }
        }
        for (dst, src) in b.chunks_mut(ldb).zip(c.chunks(m)) {
            dst[..m].copy_from_slice(src)
        }

        timer.record_end();
        timer.toc()
    }
}

/// Blocking of the host kernel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TrmmConfig {
    /// Largest block of the triangular operand handled at once.
    pub nb: usize,
    /// Width of the panels of `B` swept independently: columns (left) or rows (right).
    pub db: usize,
    /// Bisect the operand recursively down to `nb` instead of cutting fixed `nb` blocks.
    pub custom: bool,
}

impl TrmmConfig {
    /// Block boundaries `0 = b_0 < b_1 < .. = k`.
    fn blocks(&self, k: usize) -> Vec<usize> {
        fn bisect(lo: usize, hi: usize, nb: usize, out: &mut Vec<usize>) {
            if hi - lo <= nb {
                out.push(hi)
            } else {
                let mid = lo + (hi - lo) / 2;
                bisect(lo, mid, nb, out);
                bisect(mid, hi, nb, out)
            }
        }

        let nb = self.nb.max(1);
        let mut ans = vec![0];
        if self.custom {
            bisect(0, k, nb, &mut ans)
        } else {
            ans.extend((1..=k.div_ceil(nb)).map(|i| (i * nb).min(k)))
        }
        ans
    }
}

/// Blocked in-place host kernel.
///
/// `B` is cut into `db` wide panels that do not depend on each other.
/// Inside a panel, blocks of `B` are rewritten in the order that keeps every block they read
/// from still unmodified, so only one block of scratch is needed.
/// Each inner product is summed per block of the triangular operand, then across blocks.
pub struct Blocked {
    config: TrmmConfig,
}

impl Blocked {
    pub fn new(config: TrmmConfig) -> Self {
        Self { config }
    }
}

impl<T: Scalar> Trmm<T> for Blocked {
    fn trmm(
        &mut self,
        p: &TrmmParams,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &mut [T],
        ldb: usize,
    ) -> f64 {
        let host = HostTimeline;
        let mut timer = Timer::new(&host);
        timer.tic();

        let k = p.order(m, n);
        let bounds = self.config.blocks(k);
        let blocks = bounds.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>();
        // op(A) 下三角时，左乘从下往上、右乘从左往右改写
        let forward = p.lower() == (p.side == Side::Right);
        let mut order = blocks.clone();
        if !forward {
            order.reverse()
        }
        // op(A) 第 i 行（左乘）或第 j 列（右乘）的非零范围
        let nonzero = |x: usize| {
            if p.lower() == (p.side == Side::Left) {
                (0, x + 1)
            } else {
                (x, k)
            }
        };
        let dot = |(l0, l1): (usize, usize), f: &dyn Fn(usize) -> T| {
            let mut acc = T::zero();
            for &(b0, b1) in &blocks {
                let (s, e) = (b0.max(l0), b1.min(l1));
                if s < e {
                    let mut part = T::zero();
                    for l in s..e {
                        part += f(l)
                    }
                    acc += part
                }
            }
            acc
        };

        let width = match p.side {
            Side::Left => n,
            Side::Right => m,
        };
        let db = self.config.db.max(1);
        let mut scratch = Vec::new();
        for p0 in (0..width).step_by(db) {
            let p1 = (p0 + db).min(width);
            for &(lo, hi) in &order {
                scratch.clear();
                match p.side {
                    Side::Left => {
                        let len = hi - lo;
                        for j in p0..p1 {
                            for i in lo..hi {
                                let f = |l: usize| p.op_a(a, lda, i, l) * b[l + j * ldb];
                                scratch.push(alpha * dot(nonzero(i), &f))
                            }
                        }
                        for (j, src) in (p0..p1).zip(scratch.chunks(len)) {
                            b[lo + j * ldb..][..len].copy_from_slice(src)
                        }
                    }
                    Side::Right => {
                        let len = p1 - p0;
                        for j in lo..hi {
                            for i in p0..p1 {
                                let f = |l: usize| b[i + l * ldb] * p.op_a(a, lda, l, j);
                                scratch.push(alpha * dot(nonzero(j), &f))
                            }
                        }
                        for (j, src) in (lo..hi).zip(scratch.chunks(len)) {
                            b[p0 + j * ldb..][..len].copy_from_slice(src)
                        }
                    }
                }
            }
        }

        timer.record_end();
        timer.toc()
    }
}

/// Floating point operations of one multiply, complex ones counted as real ones.
pub fn flops<T: Scalar>(p: &TrmmParams, m: usize, n: usize) -> f64 {
    let (m, n) = (m as f64, n as f64);
    let (mul, add) = match p.side {
        Side::Left => (0.5 * n * m * (m + 1.), 0.5 * n * m * (m - 1.)),
        Side::Right => (0.5 * m * n * (n + 1.), 0.5 * m * n * (n - 1.)),
    };
    if T::IS_COMPLEX {
        6. * mul + 2. * add
    } else {
        mul + add
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_utils::{
        BatchLayout, Complex64, MatrixLayout, Spectrum, Synthesizer, get_max_error_matrix,
        rand_matrix, worker_rng,
    };

    const SIDES: [Side; 2] = [Side::Left, Side::Right];
    const UPLOS: [Uplo; 2] = [Uplo::Lower, Uplo::Upper];
    const TRANS: [Trans; 3] = [Trans::NoTrans, Trans::Trans, Trans::ConjTrans];
    const DIAGS: [Diag; 2] = [Diag::NonUnit, Diag::Unit];

    fn all_params() -> impl Iterator<Item = TrmmParams> {
        SIDES.into_iter().flat_map(|side| {
            UPLOS.into_iter().flat_map(move |uplo| {
                TRANS.into_iter().flat_map(move |trans| {
                    DIAGS.into_iter().map(move |diag| TrmmParams {
                        side,
                        uplo,
                        trans,
                        diag,
                    })
                })
            })
        })
    }

    #[test]
    fn test_reference() {
        // A = [1 0; 2 3]，B = [1 2; 3 4]
        let a = [1., 2., 9., 3.];
        let b = [1., 3., 2., 4.];
        let p = TrmmParams::default();

        let mut x = b;
        Reference.trmm(&p, 2, 2, 2., &a, 2, &mut x, 2);
        assert_eq!(x, [2., 22., 4., 32.]);

        let mut x = b;
        let p = TrmmParams {
            side: Side::Right,
            trans: Trans::Trans,
            diag: Diag::Unit,
            ..p
        };
        // B·[1 2; 0 1]
        Reference.trmm(&p, 2, 2, 1., &a, 2, &mut x, 2);
        assert_eq!(x, [1., 3., 4., 10.]);
    }

    #[test]
    fn test_conj_trans() {
        let i = Complex64::new(0., 1.);
        let a = [Complex64::new(2., 0.), i, i, Complex64::new(1., 0.)];
        let b = [Complex64::new(1., 0.), Complex64::new(1., 0.)];
        let p = TrmmParams {
            trans: Trans::ConjTrans,
            ..Default::default()
        };
        // op(A) = [2 -i; 0 1]
        let mut x = b;
        Reference.trmm(&p, 2, 1, Complex64::new(1., 0.), &a, 2, &mut x, 2);
        assert_eq!(x, [Complex64::new(2., -1.), Complex64::new(1., 0.)]);
    }

    #[test]
    fn test_blocks() {
        let fixed = TrmmConfig { nb: 4, db: 512, custom: false };
        assert_eq!(fixed.blocks(10), [0, 4, 8, 10]);
        assert_eq!(fixed.blocks(8), [0, 4, 8]);
        let custom = TrmmConfig { nb: 4, db: 512, custom: true };
        assert_eq!(custom.blocks(10), [0, 2, 5, 7, 10]);
        assert_eq!(custom.blocks(3), [0, 3]);
    }

    #[test]
    fn test_blocked_matches_reference() {
        let (m, n) = (13, 9);
        let ldb = 16;
        let mut rng = worker_rng(5, 0);
        for p in all_params() {
            let k = p.order(m, n);
            let lda = k + 2;
            let mut a = vec![Complex64::default(); lda * k];
            let mut b = vec![Complex64::default(); ldb * n];
            rand_matrix(k, k, &mut a, lda, &mut rng).unwrap();
            rand_matrix(m, n, &mut b, ldb, &mut rng).unwrap();
            let alpha = Complex64::new(0.29, -0.5);

            let mut expect = b.clone();
            Reference.trmm(&p, m, n, alpha, &a, lda, &mut expect, ldb);
            for config in [
                TrmmConfig { nb: 4, db: 512, custom: false },
                TrmmConfig { nb: 3, db: 2, custom: true },
                TrmmConfig { nb: 64, db: 5, custom: false },
            ] {
                let mut x = b.clone();
                Blocked::new(config).trmm(&p, m, n, alpha, &a, lda, &mut x, ldb);
                let err = get_max_error_matrix(&expect, &x, m, n, ldb).unwrap();
                assert!(err < 1e-12, "{p:?} {config:?}: {err:e}");
                // 填充行不动
                assert!(x.chunks(ldb).zip(b.chunks(ldb)).all(|(x, b)| x[m..] == b[m..]));
            }
        }
    }

    #[test]
    fn test_blocked_sums_per_block() {
        let n = 64;
        let mut rng = worker_rng(9, 0);
        let mut a = vec![0.0f64; n * n];
        let mut b = vec![0.0f64; n * n];
        rand_matrix(n, n, &mut a, n, &mut rng).unwrap();
        rand_matrix(n, n, &mut b, n, &mut rng).unwrap();
        for p in all_params() {
            let mut expect = b.clone();
            Reference.trmm(&p, n, n, 0.29, &a, n, &mut expect, n);

            // 单块时求和顺序与参考实现相同
            let mut x = b.clone();
            Blocked::new(TrmmConfig { nb: n, db: n, custom: false })
                .trmm(&p, n, n, 0.29, &a, n, &mut x, n);
            assert_eq!(x, expect, "{p:?}");

            let mut x = b.clone();
            Blocked::new(TrmmConfig { nb: 8, db: n, custom: false })
                .trmm(&p, n, n, 0.29, &a, n, &mut x, n);
            assert_ne!(x, expect, "{p:?}");
            let err = get_max_error_matrix(&expect, &x, n, n, n).unwrap();
            assert!(err < 1e-13, "{p:?}: {err:e}");
        }
    }

    #[test]
    fn test_panels_do_not_change_the_result() {
        let (m, n) = (11, 17);
        let mut rng = worker_rng(3, 0);
        for p in all_params() {
            let k = p.order(m, n);
            let mut a = vec![0.0f64; k * k];
            let mut b = vec![0.0f64; m * n];
            rand_matrix(k, k, &mut a, k, &mut rng).unwrap();
            rand_matrix(m, n, &mut b, m, &mut rng).unwrap();

            let mut whole = b.clone();
            Blocked::new(TrmmConfig { nb: 4, db: 64, custom: false })
                .trmm(&p, m, n, 0.29, &a, k, &mut whole, m);
            for db in [1, 3, 8] {
                let mut x = b.clone();
                Blocked::new(TrmmConfig { nb: 4, db, custom: false })
                    .trmm(&p, m, n, 0.29, &a, k, &mut x, m);
                assert_eq!(x, whole, "{p:?} db = {db}");
            }
        }
    }

    #[test]
    fn test_conditioned_100() {
        let n = 100;
        let layout = MatrixLayout::dense(n, n).unwrap();
        let mut a = vec![0.0f64; n * n];
        Synthesizer::new(Spectrum::Condition(1e6))
            .seed(1)
            .generate(&mut a, BatchLayout::single(layout), None)
            .unwrap();
        let mut b = vec![0.0f64; n * n];
        rand_matrix(n, n, &mut b, n, &mut worker_rng(1, 1)).unwrap();

        let p = TrmmParams::default();
        let mut expect = b.clone();
        Reference.trmm(&p, n, n, 0.29, &a, n, &mut expect, n);
        let mut x = b.clone();
        Blocked::new(TrmmConfig { nb: 32, db: 512, custom: true })
            .trmm(&p, n, n, 0.29, &a, n, &mut x, n);

        let err = get_max_error_matrix(&expect, &x, n, n, n).unwrap();
        assert!(err < 1e-10, "{err:e}");
    }

    #[test]
    fn test_flops() {
        let p = TrmmParams::default();
        assert_eq!(flops::<f64>(&p, 2, 3), 12.);
        assert_eq!(flops::<Complex64>(&p, 2, 3), 6. * 9. + 2. * 3.);
    }
}
