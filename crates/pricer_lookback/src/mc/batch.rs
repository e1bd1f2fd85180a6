//! Partitioning of paths into blocks and worker batches.
//!
//! Paths are grouped into consecutive blocks of a fixed size. Each block is
//! accumulated sequentially, so the summation order inside a block depends
//! only on the block size. Batches hand contiguous runs of whole blocks to
//! workers: near-equal in block count, remainder to the first batches.
//!
//! The default block size depends on the path count alone and keeps the
//! block count between half of [`TARGET_BLOCK_COUNT`] and all of it (or one
//! path per block for small runs). Batch sizes therefore differ by at most
//! one small block, and every worker gets a batch unless there are fewer
//! blocks than workers.
//!
//! ```text
//! paths   0 ............................................ M-1
//! blocks  [ b0 ][ b1 ][ b2 ][ b3 ][ b4 ][ b5 ][ b6 ][b7]
//! batches [ batch 0      ][ batch 1      ][ batch 2   ]
//! ```

use std::ops::Range;

/// Number of blocks the default block size aims for.
pub const TARGET_BLOCK_COUNT: usize = 4096;

/// Default block size for `n_paths` paths: `max(1, ceil(n_paths / 4096))`.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::mc::default_block_size;
///
/// assert_eq!(default_block_size(4_000), 1);
/// assert_eq!(default_block_size(100_000), 25);
/// ```
#[inline]
pub fn default_block_size(n_paths: usize) -> usize {
    n_paths.div_ceil(TARGET_BLOCK_COUNT).max(1)
}

/// A contiguous run of blocks assigned to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Position of the batch in the reduction order.
    pub index: usize,
    /// Index of the first block.
    pub first_block: usize,
    /// Number of blocks.
    pub block_count: usize,
}

impl Batch {
    /// Block indices covered by this batch.
    #[inline]
    pub fn blocks(&self) -> Range<usize> {
        self.first_block..self.first_block + self.block_count
    }
}

/// Layout of one run: block boundaries and batch assignment.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::mc::BatchPlan;
///
/// let plan = BatchPlan::new(10, 3, 2);
/// assert_eq!(plan.block_count(), 5);
/// assert_eq!(plan.batches().len(), 3);
/// assert_eq!(plan.batches()[0].block_count, 2);
/// assert_eq!(plan.block_paths(4), 8..10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    n_paths: usize,
    block_size: usize,
    batches: Vec<Batch>,
}

impl BatchPlan {
    /// Lays out `n_paths` over at most `workers` batches.
    ///
    /// The batch count is `min(workers, blocks)`, and at least one batch is
    /// produced when there are paths. `workers` and `block_size` of zero are
    /// treated as one.
    pub fn new(n_paths: usize, workers: usize, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let n_blocks = n_paths.div_ceil(block_size);
        let n_batches = workers.max(1).min(n_blocks);

        let mut batches = Vec::with_capacity(n_batches);
        if n_batches > 0 {
            let base = n_blocks / n_batches;
            let remainder = n_blocks % n_batches;
            let mut first_block = 0;
            for index in 0..n_batches {
                let block_count = base + usize::from(index < remainder);
                batches.push(Batch {
                    index,
                    first_block,
                    block_count,
                });
                first_block += block_count;
            }
        }

        Self {
            n_paths,
            block_size,
            batches,
        }
    }

    /// Total number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Paths per full block.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks; the last one may be short.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.n_paths.div_ceil(self.block_size)
    }

    /// Batches in reduction order.
    #[inline]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Global path indices of block `block`.
    #[inline]
    pub fn block_paths(&self, block: usize) -> Range<usize> {
        let start = (block * self.block_size).min(self.n_paths);
        let end = (start + self.block_size).min(self.n_paths);
        start..end
    }

    /// Global path indices of `batch`.
    #[inline]
    pub fn batch_paths(&self, batch: &Batch) -> Range<usize> {
        let blocks = batch.blocks();
        let start = self.block_paths(blocks.start).start;
        let end = if batch.block_count == 0 {
            start
        } else {
            self.block_paths(blocks.end - 1).end
        };
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remainder_goes_to_first_batches() {
        let plan = BatchPlan::new(70, 3, 10);
        let counts: Vec<usize> = plan.batches().iter().map(|b| b.block_count).collect();
        assert_eq!(counts, vec![3, 2, 2]);
        assert_eq!(plan.batch_paths(&plan.batches()[0]), 0..30);
        assert_eq!(plan.batch_paths(&plan.batches()[2]), 50..70);
    }

    fn path_counts(plan: &BatchPlan) -> Vec<usize> {
        plan.batches()
            .iter()
            .map(|b| plan.batch_paths(b).len())
            .collect()
    }

    #[test]
    fn test_default_blocks_fill_every_worker() {
        for (n_paths, workers) in [(4_000, 4), (100_000, 4), (10_000, 8), (30_001, 7)] {
            let block_size = default_block_size(n_paths);
            let plan = BatchPlan::new(n_paths, workers, block_size);
            assert_eq!(plan.batches().len(), workers, "{n_paths} paths");

            let counts = path_counts(&plan);
            let max = *counts.iter().max().unwrap();
            let min = *counts.iter().min().unwrap();
            assert!(max - min <= block_size, "{n_paths} paths: {counts:?}");
            assert_eq!(counts.iter().sum::<usize>(), n_paths);
        }
    }

    #[test]
    fn test_default_blocks_exact_split() {
        let plan = BatchPlan::new(4_000, 4, default_block_size(4_000));
        assert_eq!(path_counts(&plan), vec![1_000; 4]);

        let plan = BatchPlan::new(10, 4, default_block_size(10));
        assert_eq!(path_counts(&plan), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_fewer_paths_than_workers() {
        let plan = BatchPlan::new(3, 8, default_block_size(3));
        assert_eq!(plan.batches().len(), 3);
    }

    #[test]
    fn test_default_block_size_bounds_block_count() {
        assert_eq!(default_block_size(0), 1);
        assert_eq!(default_block_size(4_096), 1);
        assert_eq!(default_block_size(4_097), 2);
        for n_paths in [5_000_usize, 100_000, 1_000_000, 10_000_001] {
            let blocks = n_paths.div_ceil(default_block_size(n_paths));
            assert!(blocks <= TARGET_BLOCK_COUNT);
            assert!(blocks >= TARGET_BLOCK_COUNT / 2, "{n_paths}: {blocks}");
        }
    }

    #[test]
    fn test_workers_clamped_to_blocks() {
        let plan = BatchPlan::new(5, 8, 4096);
        assert_eq!(plan.batches().len(), 1);
        assert_eq!(plan.batch_paths(&plan.batches()[0]), 0..5);
    }

    #[test]
    fn test_short_last_block() {
        let plan = BatchPlan::new(25, 2, 10);
        assert_eq!(plan.block_count(), 3);
        assert_eq!(plan.block_paths(2), 20..25);
    }

    #[test]
    fn test_empty_plan() {
        let plan = BatchPlan::new(0, 4, 10);
        assert!(plan.batches().is_empty());
    }

    proptest! {
        #[test]
        fn prop_batches_tile_paths_exactly(
            n_paths in 1usize..5_000,
            workers in 1usize..32,
            block_size in 1usize..600,
        ) {
            let plan = BatchPlan::new(n_paths, workers, block_size);
            let mut next = 0;
            for (i, batch) in plan.batches().iter().enumerate() {
                prop_assert_eq!(batch.index, i);
                prop_assert!(batch.block_count >= 1);
                let paths = plan.batch_paths(batch);
                prop_assert_eq!(paths.start, next);
                next = paths.end;
            }
            prop_assert_eq!(next, n_paths);

            let counts: Vec<usize> = plan.batches().iter().map(|b| b.block_count).collect();
            let max = *counts.iter().max().unwrap();
            let min = *counts.iter().min().unwrap();
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn prop_block_layout_independent_of_workers(
            n_paths in 1usize..5_000,
            w1 in 1usize..16,
            w2 in 1usize..16,
        ) {
            let a = BatchPlan::new(n_paths, w1, default_block_size(n_paths));
            let b = BatchPlan::new(n_paths, w2, default_block_size(n_paths));
            prop_assert_eq!(a.block_count(), b.block_count());
            for block in 0..a.block_count() {
                prop_assert_eq!(a.block_paths(block), b.block_paths(block));
            }
        }
    }
}
