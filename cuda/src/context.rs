use crate::{
    AsRaw, Device,
    bindings::{CUcontext, CUdevice},
};
use std::ptr::null_mut;

/// 设备的主上下文。
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct Context {
    ctx: CUcontext,
    dev: CUdevice,
}

impl Device {
    #[inline]
    pub fn context(&self) -> Context {
        let dev = unsafe { self.as_raw() };
        let mut ctx = null_mut();
        driver!(cuDevicePrimaryCtxRetain(&mut ctx, dev));
        Context { ctx, dev }
    }
}

impl Drop for Context {
    #[inline]
    fn drop(&mut self) {
        driver!(cuDevicePrimaryCtxRelease_v2(self.dev));
    }
}

unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl AsRaw for Context {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ctx
    }
}

impl Context {
    /// 将上下文压栈，在闭包内执行依赖上下文的操作。
    #[inline]
    pub fn apply<T>(&self, f: impl FnOnce(&CurrentCtx) -> T) -> T {
        driver!(cuCtxPushCurrent_v2(self.ctx));
        f(&CurrentCtx(self.ctx))
    }
}

/// The context on top of the current thread's stack.
/// Popped when the [`Context::apply`] closure returns, including by unwinding.
#[repr(transparent)]
pub struct CurrentCtx(CUcontext);

impl Drop for CurrentCtx {
    #[inline]
    fn drop(&mut self) {
        let mut top = null_mut();
        driver!(cuCtxPopCurrent_v2(&mut top));
        assert_eq!(top, self.0)
    }
}

impl AsRaw for CurrentCtx {
    type Raw = CUcontext;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

#[test]
fn test_apply() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = Device::fetch() else {
        return;
    };
    let ctx = dev.context();
    let outer = ctx.apply(|ctx| unsafe { ctx.as_raw() });
    assert_eq!(outer, unsafe { ctx.as_raw() });

    let mut current = null_mut();
    driver!(cuCtxGetCurrent(&mut current));
    assert!(current.is_null());
}
