use std::{ptr::null_mut, slice};
use test_utils::{BatchLayout, Result, batch_views, batch_views_mut, generate_array_of_pointers};

/// Per-matrix operands of a batch.
///
/// Strided batches are cut every `stride` elements, otherwise every operand
/// is read through an array of pointers.
pub fn operands<T>(data: &[T], layout: BatchLayout, strided: bool) -> Result<Vec<&[T]>> {
    if strided {
        return batch_views(data, layout);
    }
    let span = layout.matrix.span();
    Ok(pointers(data.as_ptr().cast_mut(), data.len(), layout)?
        .into_iter()
        // SAFETY: 每个指针指向 data 内完整的一个矩阵
        .map(|p| unsafe { slice::from_raw_parts(p.cast_const(), span) })
        .collect())
}

/// Exclusive form of [`operands`].
pub fn operands_mut<T>(
    data: &mut [T],
    layout: BatchLayout,
    strided: bool,
) -> Result<Vec<&mut [T]>> {
    if strided {
        return batch_views_mut(data, layout);
    }
    let span = layout.matrix.span();
    Ok(pointers(data.as_mut_ptr(), data.len(), layout)?
        .into_iter()
        // SAFETY: stride >= span，各矩阵互不重叠
        .map(|p| unsafe { slice::from_raw_parts_mut(p, span) })
        .collect())
}

fn pointers<T>(data: *mut T, len: usize, layout: BatchLayout) -> Result<Vec<*mut T>> {
    layout.check_len(len)?;
    let mut ptrs = vec![null_mut(); layout.count];
    generate_array_of_pointers(data, &mut ptrs, layout.stride, layout.count)?;
    Ok(ptrs)
}
