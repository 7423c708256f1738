//! Input synthesis and result checking for dense linear algebra kernel tests.

mod check;
mod error;
mod generate;
mod hpd;
mod layout;
mod orthogonal;
mod pointers;
mod print;
mod rng;
mod scalar;
mod spectrum;
mod stats;
mod timer;

pub mod flags;
pub mod opts;

#[cfg(test)]
mod jacobi;

pub use check::{
    Verdict, element_error, get_max_error, get_max_error_matrix, get_max_error_matrix_uplo,
};
pub use error::{ConfigError, Result};
pub use generate::{StreamKey, Svals, Synthesizer, generate_random_matrices};
pub use hpd::make_hpd;
pub use layout::{BatchLayout, MatrixLayout};
pub use opts::{Size, SizeRange, TestOptions};
pub use pointers::{batch_views, batch_views_mut, generate_array_of_pointers};
pub use print::{write_batch, write_matrix};
pub use rng::{Fill, WorkerRng, generate_random, rand_matrix, rand_matrix_with, worker_rng};
pub use scalar::{Complex32, Complex64, Real, Scalar};
pub use spectrum::Spectrum;
pub use stats::avg_and_stdev;
pub use timer::{HostTimeline, Timeline, Timer, gettime};

#[cfg(nvidia)]
pub use pointers::device;
