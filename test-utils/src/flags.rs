use clap::ValueEnum;

/// Which triangle of a square operand is referenced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, ValueEnum)]
pub enum Uplo {
    #[default]
    #[value(name = "l", alias = "lower")]
    Lower,
    #[value(name = "u", alias = "upper")]
    Upper,
}

/// Side the triangular operand is applied from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, ValueEnum)]
pub enum Side {
    #[default]
    #[value(name = "l", alias = "left")]
    Left,
    #[value(name = "r", alias = "right")]
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, ValueEnum)]
pub enum Trans {
    #[default]
    #[value(name = "n", alias = "no-trans")]
    NoTrans,
    #[value(name = "t", alias = "trans")]
    Trans,
    /// Conjugate transpose.
    #[value(name = "c", alias = "conj-trans")]
    ConjTrans,
}

/// Whether the triangular operand has an implicit unit diagonal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, ValueEnum)]
pub enum Diag {
    #[default]
    #[value(name = "n", alias = "non-unit")]
    NonUnit,
    #[value(name = "u", alias = "unit")]
    Unit,
}

impl Uplo {
    /// `true` if element `(i, j)` belongs to this triangle, diagonal included.
    #[inline]
    pub const fn contains(self, i: usize, j: usize) -> bool {
        match self {
            Self::Lower => i >= j,
            Self::Upper => i <= j,
        }
    }
}

#[test]
fn test_contains() {
    assert!(Uplo::Lower.contains(3, 1));
    assert!(!Uplo::Lower.contains(1, 3));
    assert!(Uplo::Upper.contains(1, 3));
    assert!(Uplo::Upper.contains(2, 2) && Uplo::Lower.contains(2, 2));
}
