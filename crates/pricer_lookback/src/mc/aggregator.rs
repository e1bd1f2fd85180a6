//! Parallel aggregation of simulated paths.
//!
//! A run goes through three phases:
//!
//! 1. **Plan**: paths are laid out in blocks and batches ([`BatchPlan`]).
//! 2. **Simulate**: a dedicated Rayon pool runs one task per batch. Each task
//!    walks its blocks in order, binds sub-stream `i` to global path `i`, and
//!    accumulates raw payoffs into one [`PartialAccumulator`] per block. No
//!    state is shared between tasks.
//! 3. **Reduce**: after the pool joins, the calling thread merges the block
//!    accumulators in batch order then block order, which is global block
//!    order regardless of the worker count or completion order.
//!
//! A non-finite value in any path fails the whole run.

use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use super::accumulator::PartialAccumulator;
use super::batch::{Batch, BatchPlan};
use super::config::EngineConfig;
use crate::error::PricingError;
use crate::estimator::{finalize_with, PricingResult};
use crate::params::SimulationParameters;
use super::config::PathScheme;
use crate::path::{BridgeSimulator, LogEulerSimulator, PathSimulator};
use crate::payoff::LookbackPayoff;
use crate::rng::RandomSubStream;

/// Ordered block accumulators produced by one worker.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPartial {
    /// Batch index in the reduction order.
    pub batch_index: usize,
    /// One accumulator per block, in block order.
    pub blocks: Vec<PartialAccumulator>,
}

/// Drives simulation and evaluation across a worker pool.
///
/// # Examples
///
/// ```rust
/// use pricer_lookback::mc::{EngineConfig, ParallelAggregator};
/// use pricer_lookback::params::{LookbackVariant, SimulationParameters};
///
/// let params = SimulationParameters::builder()
///     .spot(100.0)
///     .volatility(0.2)
///     .rate(0.05)
///     .maturity(1.0)
///     .variant(LookbackVariant::FloatingCall)
///     .n_paths(2_000)
///     .n_steps(50)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let aggregator = ParallelAggregator::new(EngineConfig::default());
/// let two = aggregator.run(&params, 2).unwrap();
/// let three = aggregator.run(&params, 3).unwrap();
/// assert_eq!(two, three);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelAggregator {
    config: EngineConfig,
}

impl ParallelAggregator {
    /// Creates an aggregator.
    #[inline]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prices `params` on `worker_count` workers with the simulator selected
    /// by [`EngineConfig::scheme`].
    ///
    /// # Errors
    ///
    /// See [`run_with`](Self::run_with).
    pub fn run(
        &self,
        params: &SimulationParameters,
        worker_count: usize,
    ) -> Result<PricingResult, PricingError> {
        match self.config.scheme() {
            PathScheme::LogEuler => {
                self.run_with(params, worker_count, &LogEulerSimulator::new(params))
            }
            PathScheme::Bridge => {
                self.run_with(params, worker_count, &BridgeSimulator::new(params))
            }
        }
    }

    /// Prices `params` with a caller-supplied simulator.
    ///
    /// The simulator must describe the same dynamics as `params`; the seed,
    /// path count and discounting are taken from `params`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `params` or `worker_count` is invalid
    /// - `InsufficientSamples` if fewer than two paths are requested
    /// - `SimulationFailure` if any path yields a non-finite value or the
    ///   worker pool cannot be built
    /// - `InternalReductionError` if the merged count differs from the
    ///   requested path count
    pub fn run_with<S: PathSimulator>(
        &self,
        params: &SimulationParameters,
        worker_count: usize,
        simulator: &S,
    ) -> Result<PricingResult, PricingError> {
        params.validate()?;
        if worker_count == 0 {
            return Err(PricingError::invalid("workers", "must be at least 1"));
        }
        let n_paths = params.n_paths();
        if n_paths < 2 {
            return Err(PricingError::InsufficientSamples { paths: n_paths });
        }

        let span = info_span!(
            "lookback_run",
            variant = %params.variant(),
            n_paths,
            n_steps = params.n_steps(),
            seed = params.seed()
        );
        let _guard = span.enter();

        let plan = BatchPlan::new(n_paths, worker_count, self.config.block_size_for(n_paths));
        debug!(
            workers = worker_count,
            batches = plan.batches().len(),
            blocks = plan.block_count(),
            block_size = plan.block_size(),
            antithetic = self.config.antithetic(),
            "batch plan ready"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("lookback-worker-{}", i))
            .build()
            .map_err(|e| PricingError::SimulationFailure {
                path_index: 0,
                reason: format!("worker pool could not be started: {}", e),
            })?;

        let payoff = LookbackPayoff::from_params(params);
        let seed = params.seed();

        // collect() keeps batch order regardless of completion order
        let partials: Vec<Result<BatchPartial, PricingError>> = pool.install(|| {
            plan.batches()
                .par_iter()
                .map(|batch| self.simulate_batch(&plan, batch, seed, simulator, &payoff))
                .collect()
        });

        let total = reduce(partials, n_paths)?;
        let result = finalize_with(total.sum, total.sum_sq, total.count, params, self.config.confidence())?;
        debug!(price = result.price, std_error = result.std_error, "run complete");
        Ok(result)
    }

    /// Simulates every path of one batch sequentially.
    fn simulate_batch<S: PathSimulator>(
        &self,
        plan: &BatchPlan,
        batch: &Batch,
        seed: u64,
        simulator: &S,
        payoff: &LookbackPayoff,
    ) -> Result<BatchPartial, PricingError> {
        let mut blocks = Vec::with_capacity(batch.block_count);
        for block in batch.blocks() {
            let mut acc = PartialAccumulator::default();
            for path_index in plan.block_paths(block) {
                let sample = self.sample_path(path_index, seed, simulator, payoff)?;
                acc.push(sample);
                if !acc.is_finite() {
                    return Err(PricingError::SimulationFailure {
                        path_index,
                        reason: "payoff moments overflowed".to_string(),
                    });
                }
            }
            blocks.push(acc);
        }
        Ok(BatchPartial {
            batch_index: batch.index,
            blocks,
        })
    }

    /// Raw payoff sample of one global path index.
    #[inline]
    fn sample_path<S: PathSimulator>(
        &self,
        path_index: usize,
        seed: u64,
        simulator: &S,
        payoff: &LookbackPayoff,
    ) -> Result<f64, PricingError> {
        let mut stream = RandomSubStream::new(seed, path_index as u64);
        let mirror = self.config.antithetic().then(|| stream.antithetic());

        let path = simulator.simulate(&mut stream);
        if !path.is_finite() {
            return Err(non_finite(path_index, "price"));
        }
        let mut value = payoff.evaluate(&path);

        if let Some(mut mirror) = mirror {
            let path = simulator.simulate(&mut mirror);
            if !path.is_finite() {
                return Err(non_finite(path_index, "antithetic price"));
            }
            value = 0.5 * (value + payoff.evaluate(&path));
        }

        if !value.is_finite() {
            return Err(non_finite(path_index, "payoff"));
        }
        Ok(value)
    }
}

fn non_finite(path_index: usize, what: &str) -> PricingError {
    warn!(path_index, "non-finite {} produced", what);
    PricingError::SimulationFailure {
        path_index,
        reason: format!("non-finite {}", what),
    }
}

/// Merges worker results in batch order.
///
/// The first failed batch in that order decides the error.
fn reduce(
    partials: Vec<Result<BatchPartial, PricingError>>,
    expected: usize,
) -> Result<PartialAccumulator, PricingError> {
    let mut total = PartialAccumulator::default();
    for partial in partials {
        let partial = partial?;
        for block in &partial.blocks {
            total.merge(block);
        }
    }
    if total.count != expected {
        return Err(PricingError::InternalReductionError {
            expected,
            actual: total.count,
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::LookbackVariant;
    use crate::path::PathExtrema;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn params(n_paths: usize) -> SimulationParameters {
        SimulationParameters::builder()
            .spot(100.0)
            .volatility(0.25)
            .rate(0.03)
            .dividend(0.01)
            .maturity(0.5)
            .strike(100.0)
            .variant(LookbackVariant::FixedPut)
            .n_paths(n_paths)
            .n_steps(20)
            .seed(2024)
            .build()
            .unwrap()
    }

    fn small_blocks() -> ParallelAggregator {
        ParallelAggregator::new(EngineConfig::builder().block_size(64).build().unwrap())
    }

    struct CountingSimulator {
        inner: LogEulerSimulator,
        calls: AtomicUsize,
    }

    impl PathSimulator for CountingSimulator {
        fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.simulate(stream)
        }
    }

    struct PoisonedSimulator {
        inner: LogEulerSimulator,
        poisoned_index: u64,
    }

    impl PathSimulator for PoisonedSimulator {
        fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema {
            if stream.index() == self.poisoned_index {
                return PathExtrema {
                    terminal: f64::NAN,
                    minimum: f64::NAN,
                    maximum: f64::NAN,
                };
            }
            self.inner.simulate(stream)
        }
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let p = params(1_000);
        let aggregator = small_blocks();
        let reference = aggregator.run(&p, 1).unwrap();
        for workers in [2, 3, 4, 7, 16] {
            assert_eq!(aggregator.run(&p, workers).unwrap(), reference);
        }
    }

    #[test]
    fn test_bridge_scheme_worker_invariant() {
        let p = params(3_001);
        let config = EngineConfig::builder().scheme(PathScheme::Bridge).build().unwrap();
        let aggregator = ParallelAggregator::new(config);
        let reference = aggregator.run(&p, 1).unwrap();
        for workers in [2, 5, 8] {
            assert_eq!(aggregator.run(&p, workers).unwrap(), reference);
        }
        assert_ne!(reference, ParallelAggregator::default().run(&p, 1).unwrap());
    }

    #[test]
    fn test_default_blocks_worker_invariant() {
        let p = params(4_000);
        let aggregator = ParallelAggregator::default();
        let reference = aggregator.run(&p, 1).unwrap();
        for workers in [2, 4, 6] {
            assert_eq!(aggregator.run(&p, workers).unwrap(), reference);
        }
    }

    #[test]
    fn test_simulates_each_path_once() {
        let p = params(777);
        let simulator = CountingSimulator {
            inner: LogEulerSimulator::new(&p),
            calls: AtomicUsize::new(0),
        };
        let result = small_blocks().run_with(&p, 3, &simulator).unwrap();
        assert_eq!(simulator.calls.load(Ordering::Relaxed), 777);
        assert_eq!(result.n_paths, 777);
    }

    #[test]
    fn test_antithetic_simulates_pairs() {
        let p = params(500);
        let simulator = CountingSimulator {
            inner: LogEulerSimulator::new(&p),
            calls: AtomicUsize::new(0),
        };
        let config = EngineConfig::builder().antithetic(true).build().unwrap();
        ParallelAggregator::new(config)
            .run_with(&p, 2, &simulator)
            .unwrap();
        assert_eq!(simulator.calls.load(Ordering::Relaxed), 1_000);
    }

    #[test]
    fn test_non_finite_path_fails_whole_run() {
        let p = params(1_000);
        let simulator = PoisonedSimulator {
            inner: LogEulerSimulator::new(&p),
            poisoned_index: 613,
        };
        let err = small_blocks().run_with(&p, 4, &simulator).unwrap_err();
        assert_eq!(
            err,
            PricingError::SimulationFailure {
                path_index: 613,
                reason: "non-finite price".to_string()
            }
        );
    }

    #[test]
    fn test_single_path_is_insufficient() {
        let p = params(1);
        assert_eq!(
            small_blocks().run(&p, 2),
            Err(PricingError::InsufficientSamples { paths: 1 })
        );
    }

    #[test]
    fn test_zero_workers_rejected() {
        let p = params(100);
        assert!(matches!(
            small_blocks().run(&p, 0),
            Err(PricingError::InvalidParameter { name: "workers", .. })
        ));
    }

    #[test]
    fn test_reduce_detects_count_mismatch() {
        let mut acc = PartialAccumulator::default();
        acc.push(1.0);
        let partials = vec![Ok(BatchPartial {
            batch_index: 0,
            blocks: vec![acc],
        })];
        assert_eq!(
            reduce(partials, 2),
            Err(PricingError::InternalReductionError {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_reduce_reports_first_failed_batch() {
        let partials = vec![
            Ok(BatchPartial {
                batch_index: 0,
                blocks: vec![PartialAccumulator::default()],
            }),
            Err(PricingError::SimulationFailure {
                path_index: 10,
                reason: "a".to_string(),
            }),
            Err(PricingError::SimulationFailure {
                path_index: 20,
                reason: "b".to_string(),
            }),
        ];
        assert!(matches!(
            reduce(partials, 0),
            Err(PricingError::SimulationFailure { path_index: 10, .. })
        ));
    }

    #[test]
    fn test_antithetic_reduces_error_for_floating_call() {
        let p = SimulationParameters::builder()
            .spot(100.0)
            .volatility(0.25)
            .rate(0.03)
            .maturity(0.5)
            .variant(LookbackVariant::FloatingCall)
            .n_paths(4_000)
            .n_steps(20)
            .seed(2024)
            .build()
            .unwrap();
        let plain = ParallelAggregator::default().run(&p, 2).unwrap();
        let config = EngineConfig::builder().antithetic(true).build().unwrap();
        let anti = ParallelAggregator::new(config).run(&p, 2).unwrap();
        assert!(anti.std_error < plain.std_error);
    }
}
