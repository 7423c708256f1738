use crate::{AsRaw, CurrentCtx, Stream, bindings as cuda};
use std::{marker::PhantomData, ptr::null_mut, time::Duration};

#[repr(transparent)]
pub struct Event<'ctx>(cuda::CUevent, PhantomData<&'ctx CurrentCtx>);

impl Drop for Event<'_> {
    #[inline]
    fn drop(&mut self) {
        driver!(cuEventDestroy_v2(self.0));
    }
}

impl AsRaw for Event<'_> {
    type Raw = cuda::CUevent;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl<'ctx> Stream<'ctx> {
    /// 在流上记录一个事件，不阻塞调用方。
    pub fn record(&self) -> Event<'ctx> {
        let mut event = null_mut();
        driver!(cuEventCreate(
            &mut event,
            CUevent_flags::CU_EVENT_DEFAULT as _
        ));
        driver!(cuEventRecord(event, self.as_raw()));
        Event(event, PhantomData)
    }

    /// Re-records an existing event at the current tail of this stream.
    pub fn record_on(&self, event: &mut Event<'ctx>) {
        driver!(cuEventRecord(event.0, self.as_raw()));
    }
}

impl Event<'_> {
    #[inline]
    pub fn synchronize(&self) {
        driver!(cuEventSynchronize(self.0));
    }

    pub fn elapse_from(&self, start: &Self) -> Duration {
        let mut ms = 0.0;
        driver!(cuEventElapsedTime(&mut ms, start.0, self.0));
        Duration::from_secs_f32(ms / 1000.0)
    }
}

#[test]
fn test_elapse() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    let Some(dev) = crate::Device::fetch() else {
        return;
    };
    dev.context().apply(|ctx| {
        let stream = ctx.stream();
        let start = stream.record();
        let mut end = stream.record();
        stream.record_on(&mut end);
        end.synchronize();
        assert!(end.elapse_from(&start) >= Duration::ZERO);
    });
}
