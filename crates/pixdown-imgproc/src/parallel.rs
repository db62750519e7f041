use rayon::prelude::*;

use crate::error::DownsampleError;

/// Controls how the per-element loops of the operators are executed.
///
/// Every strategy produces bit-identical results; only the scheduling differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process every element in parallel.
    ///
    /// This maximizes parallelism but may have overhead for small operations.
    ParallelElements,
}

/// Evaluate a fallible function for every index in `0..len` and collect the results.
///
/// The first error encountered is returned. With [`ExecutionStrategy::ParallelElements`]
/// "first" means any failing index, not necessarily the smallest one.
pub fn try_map_indices<U, F>(
    len: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<Vec<U>, DownsampleError>
where
    U: Send,
    F: Fn(usize) -> Result<U, DownsampleError> + Send + Sync,
{
    match strategy {
        ExecutionStrategy::Serial => (0..len).map(f).collect(),
        ExecutionStrategy::ParallelElements => (0..len).into_par_iter().map(f).collect(),
    }
}

/// Apply a function to each `chunk_size` chunk of `dst`, passing the chunk index.
///
/// `dst.len()` must be a multiple of `chunk_size`; a trailing remainder is left untouched.
pub fn for_each_chunk_mut<T, F>(dst: &mut [T], chunk_size: usize, strategy: ExecutionStrategy, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    match strategy {
        ExecutionStrategy::Serial => dst
            .chunks_exact_mut(chunk_size)
            .enumerate()
            .for_each(|(i, chunk)| f(i, chunk)),
        ExecutionStrategy::ParallelElements => dst
            .par_chunks_exact_mut(chunk_size)
            .enumerate()
            .for_each(|(i, chunk)| f(i, chunk)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_agree() -> Result<(), DownsampleError> {
        let serial = try_map_indices(100, ExecutionStrategy::Serial, |i| Ok(i * i))?;
        let parallel = try_map_indices(100, ExecutionStrategy::ParallelElements, |i| Ok(i * i))?;
        assert_eq!(serial, parallel);
        Ok(())
    }

    #[test]
    fn try_map_propagates_error() {
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelElements] {
            let res = try_map_indices(10, strategy, |i| {
                if i == 7 {
                    Err(DownsampleError::InvalidCoordinate { index: i })
                } else {
                    Ok(i)
                }
            });
            assert_eq!(res, Err(DownsampleError::InvalidCoordinate { index: 7 }));
        }
    }

    #[test]
    fn chunks_receive_their_index() {
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelElements] {
            let mut dst = vec![0usize; 12];
            for_each_chunk_mut(&mut dst, 3, strategy, |i, chunk| {
                chunk.iter_mut().for_each(|v| *v = i);
            });
            assert_eq!(dst, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
        }
    }
}
