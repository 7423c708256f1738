use crate::{AsRaw, bindings as cuda};
use std::{cmp::Ordering, ffi::c_int, fmt};

#[repr(transparent)]
pub struct Device(cuda::CUdevice);

impl AsRaw for Device {
    type Raw = cuda::CUdevice;
    #[inline]
    unsafe fn as_raw(&self) -> Self::Raw {
        self.0
    }
}

impl Device {
    #[inline]
    pub fn new(index: c_int) -> Self {
        let mut device = 0;
        driver!(cuDeviceGet(&mut device, index));
        Self(device)
    }

    #[inline]
    pub fn fetch() -> Option<Self> {
        if Self::count() > 0 {
            Some(Self::new(0))
        } else {
            None
        }
    }

    #[inline]
    pub fn count() -> usize {
        let mut count = 0;
        driver!(cuDeviceGetCount(&mut count));
        count as _
    }

    pub fn name(&self) -> String {
        let mut name = [0u8; 256];
        driver!(cuDeviceGetName(
            name.as_mut_ptr().cast(),
            name.len() as _,
            self.0
        ));
        let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        String::from_utf8_lossy(&name[..len]).into_owned()
    }

    #[inline]
    pub fn compute_capability(&self) -> ComputeCapability {
        use cuda::CUdevice_attribute::*;
        ComputeCapability {
            major: self.get_attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR),
            minor: self.get_attribute(CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR),
        }
    }

    #[inline]
    pub fn total_memory(&self) -> usize {
        let mut bytes = 0;
        driver!(cuDeviceTotalMem_v2(&mut bytes, self.0));
        bytes as _
    }

    #[inline]
    fn get_attribute(&self, attr: cuda::CUdevice_attribute) -> i32 {
        let mut value = 0;
        driver!(cuDeviceGetAttribute(&mut value, attr, self.0));
        value
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ComputeCapability {
    pub major: i32,
    pub minor: i32,
}

impl PartialOrd for ComputeCapability {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComputeCapability {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => self.minor.cmp(&other.minor),
            other => other,
        }
    }
}

impl fmt::Display for ComputeCapability {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[test]
fn test() {
    if let Err(crate::NoDevice) = crate::init() {
        return;
    }
    for i in 0..Device::count() {
        let dev = Device::new(i as _);
        println!(
            "gpu{i}: {} ver{} mem={}",
            dev.name(),
            dev.compute_capability(),
            dev.total_memory(),
        );
    }
}

#[test]
fn test_order() {
    let a = ComputeCapability { major: 7, minor: 5 };
    let b = ComputeCapability { major: 8, minor: 0 };
    let c = ComputeCapability { major: 8, minor: 6 };
    assert!(a < b);
    assert!(b < c);
    assert_eq!(c.to_string(), "8.6");
}
