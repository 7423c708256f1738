//! Per-matrix pointers into a strided batch, for batched kernels that take an array of operands.

use crate::{BatchLayout, Result, layout::check_len};

/// `array_of_arrays[k] = original + k * stride` for `k < num_arrays`.
///
/// Only addresses are computed, nothing is dereferenced.
pub fn generate_array_of_pointers<T>(
    original: *mut T,
    array_of_arrays: &mut [*mut T],
    stride: usize,
    num_arrays: usize,
) -> Result<()> {
    check_len(array_of_arrays.len(), num_arrays)?;
    for (k, p) in array_of_arrays[..num_arrays].iter_mut().enumerate() {
        *p = original.wrapping_add(k * stride)
    }
    Ok(())
}

/// Shared views of every matrix in the batch, `span` elements each.
pub fn batch_views<T>(data: &[T], layout: BatchLayout) -> Result<Vec<&[T]>> {
    layout.check_len(data.len())?;
    let span = layout.matrix.span();
    Ok((0..layout.count)
        .map(|k| &data[k * layout.stride..][..span])
        .collect())
}

/// Exclusive views of every matrix in the batch, `span` elements each.
pub fn batch_views_mut<T>(data: &mut [T], layout: BatchLayout) -> Result<Vec<&mut [T]>> {
    layout.check_len(data.len())?;
    let span = layout.matrix.span();
    let mut views = Vec::with_capacity(layout.count);
    let mut rest = data;
    for _ in 1..layout.count {
        let (head, tail) = rest.split_at_mut(layout.stride);
        views.push(&mut head[..span]);
        rest = tail;
    }
    views.push(&mut rest[..span]);
    Ok(views)
}

#[cfg(nvidia)]
pub mod device {
    use crate::{Result, layout::check_len};
    use cuda::{AsRaw, DevSlice, Stream, bindings::CUdeviceptr};
    use std::mem::size_of;

    /// Writes the device addresses `original + k * stride` (in elements of `T`)
    /// to the front of `array_of_arrays` and enqueues the upload on `stream`.
    pub fn generate_array_of_pointers<T>(
        original: &DevSlice,
        array_of_arrays: &mut DevSlice,
        stride: usize,
        num_arrays: usize,
        stream: &Stream,
    ) -> Result<()> {
        check_len(
            array_of_arrays.len() / size_of::<CUdeviceptr>(),
            num_arrays,
        )?;
        let base = unsafe { original.as_raw() };
        let step = (stride * size_of::<T>()) as CUdeviceptr;
        let ptrs = (0..num_arrays as CUdeviceptr)
            .map(|k| base + k * step)
            .collect::<Vec<_>>();
        array_of_arrays.copy_in_async(&ptrs, stream);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ConfigError, MatrixLayout};
    use std::ptr::null_mut;

    #[test]
    fn test_host() {
        let mut data = vec![0.0f64; 100];
        let base = data.as_mut_ptr();
        let mut ptrs = vec![null_mut(); 6];
        generate_array_of_pointers(base, &mut ptrs, 20, 5).unwrap();
        for (k, &p) in ptrs[..5].iter().enumerate() {
            assert_eq!(p, base.wrapping_add(20 * k));
        }
        assert!(ptrs[5].is_null());

        assert_eq!(
            generate_array_of_pointers(base, &mut ptrs, 20, 7),
            Err(ConfigError::BufferTooShort {
                len: 6,
                required: 7
            })
        );
        assert!(generate_array_of_pointers(base, &mut [], 20, 0).is_ok());
    }

    #[test]
    fn test_views() {
        let layout = BatchLayout::new(MatrixLayout::new(2, 3, 4).unwrap(), 12, 3).unwrap();
        let mut data = (0..layout.required_len()).collect::<Vec<_>>();
        {
            let views = batch_views(&data, layout).unwrap();
            assert_eq!(views.len(), 3);
            assert_eq!(views[2][0], 24);
            assert!(views.iter().all(|v| v.len() == 10));
        }
        for (k, v) in batch_views_mut(&mut data, layout).unwrap().into_iter().enumerate() {
            v[0] = 100 + k;
        }
        assert_eq!([data[0], data[12], data[24]], [100, 101, 102]);
        assert_eq!(
            batch_views(&data[..33], layout),
            Err(ConfigError::BufferTooShort {
                len: 33,
                required: 34
            })
        );
    }

    #[cfg(nvidia)]
    #[test]
    fn test_device() {
        if let Err(cuda::NoDevice) = cuda::init() {
            return;
        }
        let Some(dev) = cuda::Device::fetch() else {
            return;
        };
        dev.context().apply(|ctx| {
            use cuda::{AsRaw, bindings::CUdeviceptr};

            let stream = ctx.stream();
            let data = stream.malloc::<f32>(4 * 50);
            let mut ptrs = stream.malloc::<CUdeviceptr>(5);
            device::generate_array_of_pointers::<f32>(&data, &mut ptrs, 50, 4, &stream).unwrap();
            stream.synchronize();

            let mut host = [0 as CUdeviceptr; 5];
            ptrs.copy_out(&mut host);
            let base = unsafe { data.as_raw() };
            assert_eq!(&host[..4], [base, base + 200, base + 400, base + 600]);
        });
    }
}
