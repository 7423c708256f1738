use crate::{ConfigError, Result};

/// Column-major matrix: element `(i, j)` lives at `i + j * ld`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MatrixLayout {
    pub rows: usize,
    pub cols: usize,
    pub ld: usize,
}

impl MatrixLayout {
    pub fn new(rows: usize, cols: usize, ld: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyShape { rows, cols });
        }
        if ld < rows {
            return Err(ConfigError::LeadingDimension { ld, rows });
        }
        Ok(Self { rows, cols, ld })
    }

    #[inline]
    pub fn dense(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, rows)
    }

    #[inline]
    pub const fn offset(&self, i: usize, j: usize) -> usize {
        i + j * self.ld
    }

    /// Number of elements from the first to one past the last element, padding included.
    #[inline]
    pub const fn span(&self) -> usize {
        (self.cols - 1) * self.ld + self.rows
    }

    #[inline]
    pub const fn min_dim(&self) -> usize {
        if self.rows < self.cols {
            self.rows
        } else {
            self.cols
        }
    }

    pub fn check_len(&self, len: usize) -> Result<()> {
        check_len(len, self.span())
    }
}

/// `count` matrices of one shape, `stride` elements apart.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BatchLayout {
    pub matrix: MatrixLayout,
    pub stride: usize,
    pub count: usize,
}

impl BatchLayout {
    pub fn new(matrix: MatrixLayout, stride: usize, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        let span = matrix.span();
        if count > 1 && stride < span {
            return Err(ConfigError::Stride { stride, span });
        }
        Ok(Self {
            matrix,
            stride,
            count,
        })
    }

    /// A single matrix.
    #[inline]
    pub fn single(matrix: MatrixLayout) -> Self {
        Self {
            matrix,
            stride: matrix.span(),
            count: 1,
        }
    }

    #[inline]
    pub const fn required_len(&self) -> usize {
        (self.count - 1) * self.stride + self.matrix.span()
    }

    pub fn check_len(&self, len: usize) -> Result<()> {
        check_len(len, self.required_len())
    }
}

pub(crate) fn check_len(len: usize, required: usize) -> Result<()> {
    if len < required {
        Err(ConfigError::BufferTooShort { len, required })
    } else {
        Ok(())
    }
}

#[test]
fn test_layout() {
    let m = MatrixLayout::new(3, 4, 5).unwrap();
    assert_eq!(m.offset(2, 3), 17);
    assert_eq!(m.span(), 18);
    assert_eq!(m.min_dim(), 3);
    assert_eq!(
        MatrixLayout::new(3, 4, 2),
        Err(ConfigError::LeadingDimension { ld: 2, rows: 3 })
    );
    assert_eq!(
        MatrixLayout::dense(0, 4),
        Err(ConfigError::EmptyShape { rows: 0, cols: 4 })
    );

    let b = BatchLayout::new(m, 20, 3).unwrap();
    assert_eq!(b.required_len(), 58);
    assert!(b.check_len(58).is_ok());
    assert_eq!(
        b.check_len(57),
        Err(ConfigError::BufferTooShort {
            len: 57,
            required: 58
        })
    );
    assert_eq!(
        BatchLayout::new(m, 17, 2),
        Err(ConfigError::Stride {
            stride: 17,
            span: 18
        })
    );
    // 单个矩阵不关心 stride
    assert!(BatchLayout::new(m, 0, 1).is_ok());
    assert_eq!(BatchLayout::new(m, 20, 0), Err(ConfigError::EmptyBatch));
}
