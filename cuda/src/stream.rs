use crate::{AsRaw, CurrentCtx, bindings as cuda};
use std::ptr::null_mut;

/// 提交到同一个流上的操作按提交顺序执行。
pub struct Stream<'ctx>(cuda::CUstream, &'ctx CurrentCtx);

impl CurrentCtx {
    #[inline]
    pub fn stream(&self) -> Stream<'_> {
        let mut stream = null_mut();
        driver!(cuStreamCreate(&mut stream, 0));
        Stream(stream, self)
    }
}

impl Drop for Stream<'_> {
    #[inline]
    fn drop(&mut self) {
        self.synchronize();
        driver!(cuStreamDestroy_v2(self.0));
    }
}

impl AsRaw for Stream<'_> {
    type Raw = cuda::CUstream;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl<'ctx> Stream<'ctx> {
    /// Blocks until every operation enqueued so far has completed.
    #[inline]
    pub fn synchronize(&self) {
        driver!(cuStreamSynchronize(self.0));
    }

    #[inline]
    pub fn ctx(&self) -> &'ctx CurrentCtx {
        self.1
    }
}
