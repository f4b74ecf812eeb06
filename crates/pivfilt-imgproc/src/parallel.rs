use rayon::prelude::*;
use thiserror::Error;

/// Number of output samples at which [`ExecutionStrategy::Auto`] switches to parallel.
pub const AUTO_PARALLEL_THRESHOLD: usize = 100_000;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride must be non-zero and divide the buffer.
    #[error("row stride {0} does not split a buffer of length {1}")]
    InvalidRowStride(usize, usize),
}

/// Controls how row-parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    Parallel,

    /// Parallel for buffers of at least [`AUTO_PARALLEL_THRESHOLD`] samples, serial otherwise.
    #[default]
    Auto,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Whether a buffer of `num_samples` runs on more than one thread.
    pub fn is_parallel(&self, num_samples: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::Parallel | ExecutionStrategy::Fixed(_) => true,
            ExecutionStrategy::Auto => num_samples >= AUTO_PARALLEL_THRESHOLD,
        }
    }
}

/// Apply `f(row_index, row)` to every row of `dst` with the given strategy.
///
/// Rows are disjoint, so the result does not depend on the strategy.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `dst` - The row-major destination buffer.
/// * `row_len` - Number of samples per row.
/// * `f` - The operation producing one row.
pub fn for_each_row_mut<T, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    row_len: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if row_len == 0 || dst.len() % row_len != 0 {
        return Err(ParallelError::InvalidRowStride(row_len, dst.len()));
    }

    if !strategy.is_parallel(dst.len()) {
        dst.chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
        return Ok(());
    }

    match strategy {
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            pool.install(|| par_rows_mut(dst, row_len, &f));
        }
        _ => par_rows_mut(dst, row_len, &f),
    }

    Ok(())
}

fn par_rows_mut<T, F>(dst: &mut [T], row_len: usize, f: &F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    dst.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(r, row)| f(r, row));
}
