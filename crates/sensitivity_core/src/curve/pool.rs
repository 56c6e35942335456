#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::SensitivityError;

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Bounded set of worker threads that per-bin tasks run on.
///
/// Results always come back in input order regardless of the thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    threads: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl WorkerPool {
    /// Pool with `threads` workers, at least one
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    #[must_use]
    pub fn single_threaded() -> Self {
        Self::new(1)
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Apply `f(index, item)` to every item and collect the results in order
    pub fn map_ordered<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>, SensitivityError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        if self.threads == 1 || items.len() <= 1 {
            return Ok(items.iter().enumerate().map(|(i, item)| f(i, item)).collect());
        }
        self.map_parallel(items, f)
    }

    #[cfg(feature = "parallel")]
    fn map_parallel<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>, SensitivityError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("sensitivity-bin-{i}"))
            .build()
            .map_err(|e| SensitivityError::WorkerPool(e.to_string()))?;

        Ok(pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| f(i, item))
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn map_parallel<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>, SensitivityError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        Ok(items.iter().enumerate().map(|(i, item)| f(i, item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_input_order() {
        let items: Vec<u64> = (0..64).collect();
        let pool = WorkerPool::new(4);
        let out = pool
            .map_ordered(&items, |i, &x| {
                // Uneven work so completion order differs from input order
                let spin = (64 - x) * 1000;
                let mut acc = 0u64;
                for k in 0..spin {
                    acc = acc.wrapping_add(k);
                }
                (i, x * 2, acc)
            })
            .unwrap();

        for (i, (index, doubled, _)) in out.iter().enumerate() {
            assert_eq!(*index, i);
            assert_eq!(*doubled, 2 * i as u64);
        }
    }

    #[test]
    fn test_thread_count_is_at_least_one() {
        assert_eq!(WorkerPool::new(0).threads(), 1);
        assert_eq!(WorkerPool::single_threaded().threads(), 1);
        assert!(WorkerPool::default().threads() >= 1);
    }

    #[test]
    fn test_empty_input() {
        let out: Vec<usize> = WorkerPool::new(3).map_ordered(&[] as &[u8], |i, _| i).unwrap();
        assert!(out.is_empty());
    }
}
