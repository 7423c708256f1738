use crate::{AsRaw, CurrentCtx, Stream, bindings as cuda};
use std::{
    alloc::Layout,
    marker::PhantomData,
    mem::size_of_val,
    ops::{Deref, DerefMut},
};

/// A byte range in device memory.
#[derive(PartialEq, Eq, Hash, Debug)]
pub struct DevSlice {
    ptr: cuda::CUdeviceptr,
    len: usize,
}

impl AsRaw for DevSlice {
    type Raw = cuda::CUdeviceptr;

    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.ptr
    }
}

impl DevSlice {
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 同步拷贝到 host，长度必须一致。
    #[inline]
    pub fn copy_out<T: Copy>(&self, slice: &mut [T]) {
        let len = size_of_val(slice);
        let dst = slice.as_mut_ptr().cast();
        assert_eq!(len, self.len);
        driver!(cuMemcpyDtoH_v2(dst, self.ptr, len));
    }

    /// Enqueues a host-to-device copy into the front of this slice on `stream`.
    ///
    /// Pageable `slice`s are staged by the driver before this returns,
    /// so the host buffer may be reused right away.
    #[inline]
    pub fn copy_in_async<T: Copy>(&mut self, slice: &[T], stream: &Stream) {
        let len = size_of_val(slice);
        let src = slice.as_ptr().cast();
        assert!(len <= self.len, "{len} bytes do not fit in {}", self.len);
        driver!(cuMemcpyHtoDAsync_v2(self.ptr, src, len, stream.as_raw()));
    }
}

pub struct DevMem<'ctx> {
    slice: DevSlice,
    _ctx: PhantomData<&'ctx CurrentCtx>,
}

impl<'ctx> Stream<'ctx> {
    pub fn malloc<T: Copy>(&self, len: usize) -> DevMem<'ctx> {
        let len = Layout::array::<T>(len)
            .expect("device allocation size overflows")
            .size();
        let mut ptr = 0;
        driver!(cuMemAllocAsync(&mut ptr, len, self.as_raw()));
        DevMem {
            slice: DevSlice { ptr, len },
            _ctx: PhantomData,
        }
    }

    pub fn from_host<T: Copy>(&self, slice: &[T]) -> DevMem<'ctx> {
        let stream = unsafe { self.as_raw() };
        let len = size_of_val(slice);
        let src = slice.as_ptr().cast();
        let mut ptr = 0;
        driver!(cuMemAllocAsync(&mut ptr, len, stream));
        driver!(cuMemcpyHtoDAsync_v2(ptr, src, len, stream));
        DevMem {
            slice: DevSlice { ptr, len },
            _ctx: PhantomData,
        }
    }
}

impl Drop for DevMem<'_> {
    #[inline]
    fn drop(&mut self) {
        driver!(cuMemFree_v2(self.slice.ptr));
    }
}

impl Deref for DevMem<'_> {
    type Target = DevSlice;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.slice
    }
}

impl DerefMut for DevMem<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.slice
    }
}

#[test]
fn test_round_trip() {
    use rand::Rng;

    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    dev.context().apply(|ctx| {
        let stream = ctx.stream();
        let mut data = vec![0.0f64; 1000];
        rand::rng().fill(&mut data[..]);
        let mem = stream.from_host(&data);
        stream.synchronize();
        let mut back = vec![0.0f64; 1000];
        mem.copy_out(&mut back);
        assert_eq!(data, back);
    });
}
