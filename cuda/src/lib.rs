#![cfg(nvidia)]

#[macro_use]
#[allow(unused, non_upper_case_globals, non_camel_case_types, non_snake_case)]
pub mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

    /// 检查 driver api 的返回值，失败时带着调用点信息直接 panic。
    #[macro_export]
    macro_rules! driver {
        ($f:expr) => {{
            #[allow(unused_imports)]
            use $crate::bindings::*;
            #[allow(unused_unsafe, clippy::macro_metavars_in_unsafe)]
            let err = unsafe { $f };
            assert_eq!(
                err,
                CUresult::CUDA_SUCCESS,
                "`{}` failed at {}:{}",
                stringify!($f),
                file!(),
                line!(),
            )
        }};
    }
}

mod context;
mod dev_mem;
mod device;
mod event;
mod stream;

pub trait AsRaw {
    type Raw;

    /// # Safety
    ///
    /// The caller must ensure that the returned item is dropped before the original item.
    unsafe fn as_raw(&self) -> Self::Raw;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NoDevice;

/// Initializes the driver. Returns [`NoDevice`] on machines without a usable gpu.
pub fn init() -> Result<(), NoDevice> {
    use bindings::{CUresult, cuInit};
    match unsafe { cuInit(0) } {
        CUresult::CUDA_SUCCESS => Ok(()),
        CUresult::CUDA_ERROR_NO_DEVICE | CUresult::CUDA_ERROR_NOT_INITIALIZED => {
            log::debug!("cuInit found no usable device");
            Err(NoDevice)
        }
        err => panic!("cuInit failed: {err:?}"),
    }
}

pub use context::{Context, CurrentCtx};
pub use dev_mem::{DevMem, DevSlice};
pub use device::{ComputeCapability, Device};
pub use event::Event;
pub use stream::Stream;
