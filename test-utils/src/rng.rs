use crate::{MatrixLayout, Result, Scalar, layout::check_len};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The random stream one worker thread draws from.
pub type WorkerRng = ChaCha8Rng;

/// Independent deterministic stream number `key` of the generator seeded with `seed`.
///
/// Different keys never share output, so workers need no coordination.
pub fn worker_rng(seed: u64, key: u64) -> WorkerRng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(key);
    rng
}

/// Elementwise distribution for plain random fills.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Fill {
    /// `[0, 1)`.
    #[default]
    Uniform,
    /// Standard normal.
    Normal,
}

impl Fill {
    #[inline]
    pub fn sample<T: Scalar, G: Rng + ?Sized>(self, rng: &mut G) -> T {
        match self {
            Self::Uniform => T::sample_uniform(rng),
            Self::Normal => T::sample_normal(rng),
        }
    }
}

/// Fills the `rows x cols` block of `a` with uniform entries. Rows past `rows` are left alone.
pub fn rand_matrix<T: Scalar, G: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    a: &mut [T],
    lda: usize,
    rng: &mut G,
) -> Result<()> {
    rand_matrix_with(rows, cols, a, lda, Fill::Uniform, rng)
}

pub fn rand_matrix_with<T: Scalar, G: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    a: &mut [T],
    lda: usize,
    fill: Fill,
    rng: &mut G,
) -> Result<()> {
    let layout = MatrixLayout::new(rows, cols, lda)?;
    layout.check_len(a.len())?;
    for col in a.chunks_mut(lda).take(cols) {
        for x in &mut col[..rows] {
            *x = fill.sample(rng);
        }
    }
    Ok(())
}

/// Fills `num_ops` consecutive runs of `num_elements` uniform values.
/// Run `i` draws from stream `i`, so the result does not depend on how runs are scheduled.
pub fn generate_random<T: Scalar>(
    data: &mut [T],
    num_elements: usize,
    num_ops: usize,
    seed: u64,
) -> Result<()> {
    check_len(data.len(), num_elements * num_ops)?;
    if num_elements == 0 {
        return Ok(());
    }
    for (op, run) in data.chunks_mut(num_elements).take(num_ops).enumerate() {
        let mut rng = worker_rng(seed, op as _);
        for x in run {
            *x = T::sample_uniform(&mut rng);
        }
    }
    Ok(())
}
