use crate::{
    Cublas,
    bindings::{
        cuComplex, cuDoubleComplex, cublasDiagType_t, cublasFillMode_t, cublasHandle_t,
        cublasOperation_t, cublasSideMode_t, cublasStatus_t,
    },
};
use cuda::{AsRaw, bindings::CUdeviceptr};
use num_complex::{Complex32, Complex64};
use std::ffi::c_int;

pub type Side = cublasSideMode_t;
pub type Fill = cublasFillMode_t;
pub type Op = cublasOperation_t;
pub type Diag = cublasDiagType_t;

/// Element types with a cuBLAS `?trmm` entry point.
pub trait TrmmScalar: Copy {
    /// # Safety
    ///
    /// `a`, `b` and `c` must be device pointers valid for the given shapes.
    #[allow(clippy::too_many_arguments)]
    unsafe fn trmm(
        handle: cublasHandle_t,
        side: Side,
        uplo: Fill,
        trans: Op,
        diag: Diag,
        m: c_int,
        n: c_int,
        alpha: Self,
        a: CUdeviceptr,
        lda: c_int,
        b: CUdeviceptr,
        ldb: c_int,
        c: CUdeviceptr,
        ldc: c_int,
    ) -> cublasStatus_t;
}

macro_rules! impl_trmm {
    ($ty:ty => $f:ident, $raw:ty, $alpha:expr) => {
        impl TrmmScalar for $ty {
            unsafe fn trmm(
                handle: cublasHandle_t,
                side: Side,
                uplo: Fill,
                trans: Op,
                diag: Diag,
                m: c_int,
                n: c_int,
                alpha: Self,
                a: CUdeviceptr,
                lda: c_int,
                b: CUdeviceptr,
                ldb: c_int,
                c: CUdeviceptr,
                ldc: c_int,
            ) -> cublasStatus_t {
                #[allow(clippy::redundant_closure_call)]
                let alpha: $raw = ($alpha)(alpha);
                unsafe {
                    crate::bindings::$f(
                        handle,
                        side,
                        uplo,
                        trans,
                        diag,
                        m,
                        n,
                        &alpha,
                        a as *const $raw,
                        lda,
                        b as *const $raw,
                        ldb,
                        c as *mut $raw,
                        ldc,
                    )
                }
            }
        }
    };
}

impl_trmm!(f32 => cublasStrmm_v2, f32, |a| a);
impl_trmm!(f64 => cublasDtrmm_v2, f64, |a| a);
impl_trmm!(Complex32 => cublasCtrmm_v2, cuComplex, |a: Complex32| cuComplex { x: a.re, y: a.im });
impl_trmm!(Complex64 => cublasZtrmm_v2, cuDoubleComplex, |a: Complex64| cuDoubleComplex {
    x: a.re,
    y: a.im
});

impl Cublas<'_> {
    /// 调用 cublas 三角矩阵乘，`C = alpha * op(A) * B` 或 `C = alpha * B * op(A)`。
    ///
    /// # Safety
    ///
    /// 这个函数使用指向显存的裸指针。
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn trmm<T: TrmmScalar>(
        &self,
        side: Side,
        uplo: Fill,
        trans: Op,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: T,
        a: CUdeviceptr,
        lda: usize,
        b: CUdeviceptr,
        ldb: usize,
        c: CUdeviceptr,
        ldc: usize,
    ) {
        cublas!(T::trmm(
            self.as_raw(),
            side,
            uplo,
            trans,
            diag,
            m as _,
            n as _,
            alpha,
            a,
            lda as _,
            b,
            ldb as _,
            c,
            ldc as _,
        ))
    }
}

#[test]
fn test_identity() {
    use cuda::Device;

    if let Err(cuda::NoDevice) = cuda::init() {
        return;
    }
    Device::new(0).context().apply(|ctx| {
        // 单位下三角矩阵乘以 B 结果仍为 B
        const N: usize = 4;
        let a: [f64; N * N] = std::array::from_fn(|i| if i % (N + 1) == 0 { 1. } else { 0. });
        let b: [f64; N * 2] = std::array::from_fn(|i| i as f64);
        let stream = ctx.stream();
        let a_dev = stream.from_host(&a);
        let b_dev = stream.from_host(&b);
        let c_dev = stream.malloc::<f64>(N * 2);
        let blas = Cublas::bind(&stream);
        unsafe {
            blas.trmm(
                Side::CUBLAS_SIDE_LEFT,
                Fill::CUBLAS_FILL_MODE_LOWER,
                Op::CUBLAS_OP_N,
                Diag::CUBLAS_DIAG_NON_UNIT,
                N,
                2,
                1.0f64,
                a_dev.as_raw(),
                N,
                b_dev.as_raw(),
                N,
                c_dev.as_raw(),
                N,
            )
        }
        stream.synchronize();
        let mut c = [0.0f64; N * 2];
        c_dev.copy_out(&mut c);
        assert_eq!(c, b);
    });
}
