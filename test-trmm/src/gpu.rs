use crate::trmm::{Trmm, TrmmParams};
use cublas::{Cublas, TrmmScalar};
use cuda::{AsRaw, Stream};
use test_utils::{
    Scalar, Timer,
    flags::{Diag, Side, Trans, Uplo},
};

/// cuBLAS out-of-place `?trmm` on one stream, driven from host buffers.
pub struct CublasTrmm<'s, 'ctx> {
    stream: &'s Stream<'ctx>,
    blas: Cublas<'ctx>,
}

impl<'s, 'ctx> CublasTrmm<'s, 'ctx> {
    pub fn new(stream: &'s Stream<'ctx>) -> Self {
        Self {
            stream,
            blas: Cublas::bind(stream),
        }
    }
}

impl<T: Scalar + TrmmScalar> Trmm<T> for CublasTrmm<'_, '_> {
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
        let k = p.order(m, n);
        let stream = self.stream;
        let a_dev = stream.from_host(&a[..(k - 1) * lda + k]);
        let b_dev = stream.from_host(&b[..(n - 1) * ldb + m]);
        let c_dev = stream.from_host(&b[..(n - 1) * ldb + m]);

        let mut timer = Timer::new(stream);
        timer.tic();
        unsafe {
            self.blas.trmm(
                match p.side {
                    Side::Left => cublas::Side::CUBLAS_SIDE_LEFT,
                    Side::Right => cublas::Side::CUBLAS_SIDE_RIGHT,
                },
                match p.uplo {
                    Uplo::Lower => cublas::Fill::CUBLAS_FILL_MODE_LOWER,
                    Uplo::Upper => cublas::Fill::CUBLAS_FILL_MODE_UPPER,
                },
                match p.trans {
                    Trans::NoTrans => cublas::Op::CUBLAS_OP_N,
                    Trans::Trans => cublas::Op::CUBLAS_OP_T,
                    Trans::ConjTrans => cublas::Op::CUBLAS_OP_C,
                },
                match p.diag {
                    Diag::NonUnit => cublas::Diag::CUBLAS_DIAG_NON_UNIT,
                    Diag::Unit => cublas::Diag::CUBLAS_DIAG_UNIT,
                },
                m,
                n,
                alpha,
                a_dev.as_raw(),
                lda,
                b_dev.as_raw(),
                ldb,
                c_dev.as_raw(),
                ldb,
            )
        }
        timer.record_end();
        let ms = timer.toc();

        c_dev.copy_out(&mut b[..(n - 1) * ldb + m]);
        ms
    }
}

#[test]
fn test_matches_host() {
    use crate::trmm::Reference;
    use test_utils::{get_max_error_matrix, rand_matrix, worker_rng};

    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    let Some(dev) = cuda::Device::fetch() else {
        return;
    };
    dev.context().apply(|ctx| {
        let stream = ctx.stream();
        let mut kernel = CublasTrmm::new(&stream);
        let (m, n, ldb) = (37, 20, 40);
        let mut rng = worker_rng(11, 0);
        for side in [Side::Left, Side::Right] {
            for trans in [Trans::NoTrans, Trans::Trans] {
                let p = TrmmParams {
                    side,
                    trans,
                    ..Default::default()
                };
                let k = p.order(m, n);
                let mut a = vec![0.0f64; k * k];
                let mut b = vec![0.0f64; ldb * n];
                rand_matrix(k, k, &mut a, k, &mut rng).unwrap();
                rand_matrix(m, n, &mut b, ldb, &mut rng).unwrap();
                let alpha = 0.29;

                let mut expect = b.clone();
                Reference.trmm(&p, m, n, alpha, &a, k, &mut expect, ldb);
                kernel.trmm(&p, m, n, alpha, &a, k, &mut b, ldb);
                let err = get_max_error_matrix(&expect, &b, m, n, ldb).unwrap();
                assert!(err < 1e-12, "{p:?}: {err:e}");
            }
        }
    });
}
