use crate::{BatchLayout, ConfigError, MatrixLayout};
use std::{
    fmt::LowerExp,
    io::{Error, ErrorKind, Write},
};

fn invalid(e: ConfigError) -> Error {
    Error::new(ErrorKind::InvalidInput, e)
}

/// Prints the `m x n` block of a column-major matrix, one row per line.
///
/// A buffer shorter than the block is rejected before anything is written.
pub fn write_matrix<T: LowerExp>(
    to: &mut impl Write,
    m: usize,
    n: usize,
    a: &[T],
    lda: usize,
) -> std::io::Result<()> {
    MatrixLayout::new(m, n, lda)
        .and_then(|layout| layout.check_len(a.len()))
        .map_err(invalid)?;
    for r in 0..m {
        for c in 0..n {
            write!(to, "{:.4e}  ", a[r + c * lda])?;
        }
        writeln!(to)?;
    }
    writeln!(to)
}

/// Prints every matrix of a strided batch under a `<rows x cols>[index]` header.
pub fn write_batch<T: LowerExp>(
    to: &mut impl Write,
    data: &[T],
    layout: BatchLayout,
) -> std::io::Result<()> {
    let BatchLayout {
        matrix: MatrixLayout { rows, cols, ld },
        stride,
        count,
    } = layout;
    layout.check_len(data.len()).map_err(invalid)?;
    for i in 0..count {
        writeln!(to, "<{rows}x{cols}>[{i}]")?;
        write_matrix(to, rows, cols, &data[i * stride..], ld)?;
    }
    Ok(())
}

#[test]
fn test_write() {
    let a = [
        1., 4., -1., //
        2., 5., -1., //
        3., 6., -1., //
    ];
    let mut buf = Vec::new();
    write_matrix(&mut buf, 2, 3, &a, 3).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "1.0000e0  2.0000e0  3.0000e0  \n4.0000e0  5.0000e0  6.0000e0  \n\n"
    );

    let layout = BatchLayout::new(MatrixLayout::new(1, 2, 1).unwrap(), 3, 2).unwrap();
    let mut buf = Vec::new();
    write_batch(&mut buf, &[1.5f32, 2., 0., -3., 4.], layout).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("<1x2>[0]\n1.5000e0  2.0000e0  \n"));
    assert!(text.contains("<1x2>[1]\n-3.0000e0  4.0000e0  \n"));
}

#[test]
fn test_short_buffer() {
    let mut buf = Vec::new();
    let e = write_matrix(&mut buf, 2, 3, &[1.0f64; 7], 3).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidInput);
    let e = write_matrix(&mut buf, 3, 1, &[1.0f64; 3], 2).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidInput);

    let layout = BatchLayout::new(MatrixLayout::dense(2, 2).unwrap(), 5, 2).unwrap();
    let e = write_batch(&mut buf, &[0.0f32; 8], layout).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidInput);
    assert!(buf.is_empty());
}
