//! # Random Stream Provider
//!
//! Deterministic, independent streams of standard normal variates for
//! parallel Monte Carlo simulation.
//!
//! ## Stream Binding
//!
//! Every stream is identified by `(seed, index)`. The pricing engine binds
//! stream `i` to global path index `i`, never to a worker, so the draws a path
//! consumes do not depend on how many workers run or which one picks the path
//! up. There is no shared generator: each stream is an owned value moved into
//! the unit of work that consumes it.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_lookback::rng::{create_streams, RandomSubStream};
//!
//! let mut streams = create_streams(Some(42), 4).unwrap();
//! let z0 = streams[0].next_normal();
//!
//! // The same (seed, index) always reproduces the same sequence
//! let mut again = RandomSubStream::new(42, 0);
//! assert_eq!(again.next_normal(), z0);
//! ```

mod stream;

pub use stream::{create_streams, derive_seed, RandomSubStream};
