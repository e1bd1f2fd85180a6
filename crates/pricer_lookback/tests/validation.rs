//! Input validation happens before any simulation work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pricer_lookback::adapter::{price_request_with, HostRequest};
use pricer_lookback::error::{PricingError, StatusCode};
use pricer_lookback::mc::{EngineConfig, ParallelAggregator};
use pricer_lookback::params::{LookbackVariant, SimulationParameters};
use pricer_lookback::path::{LogEulerSimulator, PathExtrema, PathSimulator};
use pricer_lookback::rng::RandomSubStream;

struct WorkCounter {
    inner: LogEulerSimulator,
    paths: Arc<AtomicUsize>,
}

impl PathSimulator for WorkCounter {
    fn simulate(&self, stream: &mut RandomSubStream) -> PathExtrema {
        self.paths.fetch_add(1, Ordering::SeqCst);
        self.inner.simulate(stream)
    }
}

fn request() -> HostRequest {
    HostRequest {
        spot: 100.0,
        volatility: 0.2,
        rate: 0.05,
        dividend: 0.0,
        maturity: 1.0,
        strike: Some(100.0),
        variant: LookbackVariant::FixedCall.code(),
        paths: 1_000,
        steps: 10,
        seed: Some(42),
        worker_count: Some(4),
    }
}

fn counted_price(request: &HostRequest) -> (Result<(), StatusCode>, usize) {
    let paths = Arc::new(AtomicUsize::new(0));
    let outcome = price_request_with(request, &EngineConfig::default(), |params| WorkCounter {
        inner: LogEulerSimulator::new(params),
        paths: Arc::clone(&paths),
    });
    let status = outcome.map(|_| ()).map_err(|e| e.code);
    (status, paths.load(Ordering::SeqCst))
}

#[test]
fn test_negative_volatility_rejected_without_work() {
    let bad = HostRequest {
        volatility: -0.1,
        ..request()
    };
    let (status, work) = counted_price(&bad);
    assert_eq!(status, Err(StatusCode::InvalidParameter));
    assert_eq!(work, 0);
}

#[test]
fn test_each_invariant_rejected_without_work() {
    let cases = [
        HostRequest { spot: 0.0, ..request() },
        HostRequest { spot: f64::NAN, ..request() },
        HostRequest { maturity: 0.0, ..request() },
        HostRequest { maturity: -1.0, ..request() },
        HostRequest { steps: 0, ..request() },
        HostRequest { paths: 0, ..request() },
        HostRequest { strike: None, ..request() },
        HostRequest { strike: Some(-5.0), ..request() },
        HostRequest { rate: f64::INFINITY, ..request() },
        HostRequest { seed: None, ..request() },
        HostRequest { variant: -1, ..request() },
    ];
    for case in cases {
        let (status, work) = counted_price(&case);
        assert_eq!(status, Err(StatusCode::InvalidParameter), "{case:?}");
        assert_eq!(work, 0, "{case:?}");
    }
}

#[test]
fn test_single_path_is_insufficient() {
    let one = HostRequest {
        paths: 1,
        ..request()
    };
    let (status, work) = counted_price(&one);
    assert_eq!(status, Err(StatusCode::InsufficientSamples));
    assert_eq!(work, 0);
}

#[test]
fn test_valid_request_simulates_every_path() {
    let (status, work) = counted_price(&request());
    assert_eq!(status, Ok(()));
    assert_eq!(work, 1_000);
}

struct Exploding;

impl PathSimulator for Exploding {
    fn simulate(&self, _stream: &mut RandomSubStream) -> PathExtrema {
        PathExtrema {
            terminal: f64::INFINITY,
            minimum: 100.0,
            maximum: f64::INFINITY,
        }
    }
}

#[test]
fn test_non_finite_path_fails_whole_run() {
    let params = SimulationParameters::builder()
        .spot(100.0)
        .volatility(0.2)
        .maturity(1.0)
        .variant(LookbackVariant::FloatingPut)
        .n_paths(500)
        .n_steps(5)
        .seed(1)
        .build()
        .unwrap();
    let err = ParallelAggregator::default()
        .run_with(&params, 3, &Exploding)
        .unwrap_err();
    assert!(matches!(
        err,
        PricingError::SimulationFailure { path_index: 0, .. }
    ));
    assert_eq!(err.code(), StatusCode::SimulationFailure);
}
