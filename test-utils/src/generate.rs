//! Batches of random matrices with a prescribed singular value spectrum.

use crate::{
    BatchLayout, ConfigError, MatrixLayout, Result, Scalar, Spectrum, layout::check_len,
    orthogonal::Householder, worker_rng,
};
use log::debug;
use std::thread;

/// How worker random streams are keyed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum StreamKey {
    /// One stream per worker thread.
    /// Output is reproducible for a given (seed, thread count) pair.
    #[default]
    Worker,
    /// One stream per batch index.
    /// Output is reproducible for a given seed whatever the thread count.
    Matrix,
}

/// Singular values written next to the matrices: `svals[op * stride..][..min(rows, cols)]`.
pub struct Svals<'a, R> {
    pub data: &'a mut [R],
    pub stride: usize,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Synthesizer<R> {
    spectrum: Spectrum<R>,
    seed: u64,
    threads: usize,
    key: StreamKey,
}

impl<R: crate::Real> Synthesizer<R> {
    pub fn new(spectrum: Spectrum<R>) -> Self {
        Self {
            spectrum,
            seed: 0,
            threads: 1,
            key: StreamKey::Worker,
        }
    }

    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn threads(self, threads: usize) -> Self {
        Self { threads, ..self }
    }

    pub fn stream_key(self, key: StreamKey) -> Self {
        Self { key, ..self }
    }

    /// Synthesizes `layout.count` matrices `U·diag(σ)·Vᴴ` into `m`.
    ///
    /// Every parameter is checked before the first write.
    pub fn generate<T: Scalar<Real = R>>(
        &self,
        m: &mut [T],
        layout: BatchLayout,
        svals: Option<Svals<R>>,
    ) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        self.spectrum.validate()?;
        layout.check_len(m.len())?;
        let k = layout.matrix.min_dim();
        if let Some(svals) = &svals {
            if layout.count > 1 && svals.stride < k {
                return Err(ConfigError::Stride {
                    stride: svals.stride,
                    span: k,
                });
            }
            check_len(svals.data.len(), (layout.count - 1) * svals.stride + k)?;
        }

        let mut sigma = vec![R::zero(); k];
        self.spectrum.singular_values(&mut sigma);

        let BatchLayout {
            matrix,
            stride,
            count,
        } = layout;
        let runs = runs(count, self.threads);
        debug!(
            "synthesizing {count} {}x{} matrices on {} workers, {:?}",
            matrix.rows,
            matrix.cols,
            runs.len(),
            self.spectrum
        );

        let mut m = &mut m[..layout.required_len()];
        let mut svals = svals.map(|s| (s.data, s.stride));
        let sigma = &sigma[..];
        thread::scope(|s| {
            let mut first = 0;
            for (worker, n) in runs.into_iter().enumerate() {
                let m_run = if first + n == count {
                    std::mem::take(&mut m)
                } else {
                    let (head, tail) = std::mem::take(&mut m).split_at_mut(n * stride);
                    m = tail;
                    head
                };
                let s_run = svals.as_mut().map(|(data, stride)| {
                    let len = (n * *stride).min(data.len());
                    let (head, tail) = std::mem::take(data).split_at_mut(len);
                    *data = tail;
                    (head, *stride)
                });
                let job = Job {
                    matrix,
                    stride,
                    sigma,
                    seed: self.seed,
                    key: match self.key {
                        StreamKey::Worker => Key::Worker(worker),
                        StreamKey::Matrix => Key::Matrix(first),
                    },
                };
                s.spawn(move || job.run(n, m_run, s_run));
                first += n;
            }
        });
        Ok(())
    }
}

/// Batch lengths of each worker: `count / t`, one more for the first `count % t`.
fn runs(count: usize, threads: usize) -> Vec<usize> {
    let t = threads.min(count);
    (0..t).map(|i| count / t + usize::from(i < count % t)).collect()
}

enum Key {
    Worker(usize),
    Matrix(usize),
}

struct Job<'a, R> {
    matrix: MatrixLayout,
    stride: usize,
    sigma: &'a [R],
    seed: u64,
    key: Key,
}

impl<R: crate::Real> Job<'_, R> {
    fn run<T: Scalar<Real = R>>(self, n: usize, m: &mut [T], mut svals: Option<(&mut [R], usize)>) {
        let MatrixLayout { rows, cols, ld } = self.matrix;
        let k = self.sigma.len();
        let mut u = vec![T::zero(); rows * k];
        let mut v = vec![T::zero(); cols * k];
        let mut qr = Householder::new();

        let mut rng = match self.key {
            Key::Worker(w) => worker_rng(self.seed, w as _),
            Key::Matrix(first) => worker_rng(self.seed, first as _),
        };
        for op in 0..n {
            if let Key::Matrix(first) = self.key {
                rng = worker_rng(self.seed, (first + op) as _);
            }
            qr.random_orthonormal(rows, k, &mut u, &mut rng);
            qr.random_orthonormal(cols, k, &mut v, &mut rng);

            let a = &mut m[op * self.stride..][..self.matrix.span()];
            for (j, col) in a.chunks_mut(ld).enumerate().take(cols) {
                let col = &mut col[..rows];
                col.fill(T::zero());
                for (l, &s) in self.sigma.iter().enumerate() {
                    let c = v[j + l * cols].conj().scale(s);
                    for (x, &u) in col.iter_mut().zip(&u[l * rows..][..rows]) {
                        *x += u * c;
                    }
                }
            }
            if let Some((svals, stride)) = svals.as_mut() {
                svals[op * *stride..][..k].copy_from_slice(self.sigma);
            }
        }
    }
}

/// Fills a dense strided batch (`lda = rows`), the flat form of [`Synthesizer::generate`].
///
/// `cond == 0` selects exponential decay with rate `exp_decay`.
/// Worker streams are keyed by worker index.
#[allow(clippy::too_many_arguments)]
pub fn generate_random_matrices<T: Scalar>(
    m: &mut [T],
    stride_m: usize,
    svals: Option<&mut [T::Real]>,
    stride_s: usize,
    rows: usize,
    cols: usize,
    cond: T::Real,
    exp_decay: T::Real,
    seed: u64,
    num_ops: usize,
    num_threads: usize,
) -> Result<()> {
    let spectrum = Spectrum::from_params(cond, exp_decay)?;
    let layout = BatchLayout::new(MatrixLayout::dense(rows, cols)?, stride_m, num_ops)?;
    Synthesizer::new(spectrum)
        .seed(seed)
        .threads(num_threads)
        .generate(
            m,
            layout,
            svals.map(|data| Svals {
                data,
                stride: stride_s,
            }),
        )
}

#[cfg(test)]
mod test;
