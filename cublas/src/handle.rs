use crate::bindings::cublasHandle_t;
use cuda::{AsRaw, CurrentCtx, Stream};
use std::{marker::PhantomData, ptr::null_mut};

pub struct Cublas<'ctx>(cublasHandle_t, PhantomData<&'ctx CurrentCtx>);

impl Drop for Cublas<'_> {
    #[inline]
    fn drop(&mut self) {
        cublas!(cublasDestroy_v2(self.0));
    }
}

impl AsRaw for Cublas<'_> {
    type Raw = cublasHandle_t;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl<'ctx> Cublas<'ctx> {
    #[inline]
    pub fn new(_ctx: &'ctx CurrentCtx) -> Self {
        let mut handle = null_mut();
        cublas!(cublasCreate_v2(&mut handle));
        Self(handle, PhantomData)
    }

    /// 创建句柄并绑定到流，之后的调用都提交到这个流上。
    #[inline]
    pub fn bind(stream: &Stream<'ctx>) -> Self {
        let mut ans = Self::new(stream.ctx());
        ans.set_stream(stream);
        ans
    }

    #[inline]
    pub fn set_stream(&mut self, stream: &Stream) {
        cublas!(cublasSetStream_v2(self.0, stream.as_raw().cast()));
    }
}
