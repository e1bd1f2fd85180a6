//! Parallel Monte Carlo engine.
//!
//! # Architecture
//!
//! ```text
//! LookbackPricer
//! ├── EngineConfig        (confidence level, antithetic, path scheme, block size)
//! └── ParallelAggregator
//!     ├── BatchPlan          (blocks of paths grouped into per-worker batches)
//!     ├── PathSimulator      (log-Euler or bridge, one RandomSubStream per path)
//!     ├── PartialAccumulator (per-block sum, sum of squares, count)
//!     └── finalize           (discounting and confidence bounds)
//! ```
//!
//! # Reproducibility
//!
//! Paths are grouped into blocks whose size depends on the path count but
//! not on the worker count. Each block is accumulated sequentially and blocks are merged in
//! index order, so a given seed yields bit-identical results on one worker
//! or many.
//!
//! # Examples
//!
//! ```rust
//! use pricer_lookback::mc::{EngineConfig, LookbackPricer};
//! use pricer_lookback::params::{LookbackVariant, SimulationParameters, WorkerCount};
//!
//! let params = SimulationParameters::builder()
//!     .spot(100.0)
//!     .volatility(0.2)
//!     .rate(0.05)
//!     .maturity(1.0)
//!     .strike(100.0)
//!     .variant(LookbackVariant::FixedCall)
//!     .n_paths(10_000)
//!     .n_steps(100)
//!     .seed(42)
//!     .workers(WorkerCount::Fixed(4))
//!     .build()
//!     .unwrap();
//!
//! let config = EngineConfig::builder().antithetic(true).build().unwrap();
//! let result = LookbackPricer::new(params, config).price().unwrap();
//! println!("Price: {:.4} +/- {:.4}", result.price, result.std_error);
//! ```

mod accumulator;
mod aggregator;
mod batch;
mod config;
mod pricer;

pub use accumulator::PartialAccumulator;
pub use aggregator::{BatchPartial, ParallelAggregator};
pub use batch::{default_block_size, Batch, BatchPlan, TARGET_BLOCK_COUNT};
pub use config::{EngineConfig, EngineConfigBuilder, PathScheme};
pub use pricer::LookbackPricer;
