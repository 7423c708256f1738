use thiserror::Error;

/// Invalid parameters handed to a harness operation.
/// Returned before anything is written to the caller's buffers.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum ConfigError {
    #[error("matrix shape {rows}x{cols} is empty")]
    EmptyShape { rows: usize, cols: usize },
    #[error("leading dimension {ld} is smaller than the row count {rows}")]
    LeadingDimension { ld: usize, rows: usize },
    #[error("stride {stride} is smaller than the {span} elements one item occupies")]
    Stride { stride: usize, span: usize },
    #[error("batch count must be at least 1")]
    EmptyBatch,
    #[error("worker thread count must be at least 1")]
    NoThreads,
    #[error("condition number {0} must be a finite value >= 1")]
    Condition(f64),
    #[error("exponential decay rate {0} must be a finite value > 0")]
    Decay(f64),
    #[error("buffer holds {len} elements but {required} are needed")]
    BufferTooShort { len: usize, required: usize },
    #[error("invalid option: {0}")]
    Option(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
