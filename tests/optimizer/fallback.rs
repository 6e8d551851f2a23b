use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bayesopt::maximizer::{AcquisitionMaximizer, Maximum};
use bayesopt::param::{ParamMap, ParamValue};
use bayesopt::parameter::ParameterSpec;
use bayesopt::{BayesianOptimizer, SearchSpace};

use crate::common::{LineAdapter, line_data, neg_mse};

/// Runs, but never trusts its result.
struct NeverConverges {
    calls: Arc<AtomicUsize>,
}

impl AcquisitionMaximizer for NeverConverges {
    fn maximize(
        &self,
        acquisition: &dyn Fn(&[f64]) -> f64,
        start: &[f64],
    ) -> bayesopt::Result<Maximum> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        // A point far outside the space; it must never be evaluated.
        let x = vec![1e6; start.len()];
        Ok(Maximum {
            success: false,
            value: acquisition(&x),
            x,
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn space() -> SearchSpace {
    SearchSpace::new(vec![
        ParameterSpec::continuous("slope", 0.0, 4.0),
        ParameterSpec::integer("offset", -3, 3),
    ])
    .unwrap()
}

#[test]
fn non_convergence_falls_back_to_start_values() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let start = ParamMap::from([
        ("slope".to_owned(), ParamValue::Float(0.5)),
        ("offset".to_owned(), ParamValue::Int(2)),
    ]);
    let mut optimizer = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .maximizer(NeverConverges {
            calls: Arc::clone(&calls),
        })
        .start_values(start)
        .n_restarts_optimizer(3)
        .seed(17)
        .build()
        .unwrap();

    let (x, y) = line_data(5);
    let (best, _) = optimizer.fit(x, y, None, None, 4, None).unwrap();

    assert_eq!(optimizer.non_convergence_count(), 3);
    assert_eq!(optimizer.last_success(), Some(false));
    assert_eq!(calls.load(Ordering::Relaxed), 9);
    assert_eq!(optimizer.history().len(), 4);
    for entry in optimizer.history().entries() {
        assert_eq!(entry.params, vec![ParamValue::Float(0.5), ParamValue::Int(2)]);
    }
    assert_eq!(best["offset"], ParamValue::Int(2));
}

#[test]
fn non_convergence_without_start_values_stays_in_bounds() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut optimizer = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .maximizer(NeverConverges {
            calls: Arc::clone(&calls),
        })
        .n_restarts_optimizer(0)
        .seed(2)
        .build()
        .unwrap();

    let (x, y) = line_data(5);
    optimizer.fit(x, y, None, None, 5, None).unwrap();

    // Zero restarts still makes one attempt per proposal.
    assert_eq!(calls.load(Ordering::Relaxed), 4);
    assert_eq!(optimizer.non_convergence_count(), 4);
    for entry in optimizer.history().entries() {
        let slope = entry.params[0].as_f64().unwrap();
        let offset = entry.params[1].as_i64().unwrap();
        assert!((0.0..=4.0).contains(&slope));
        assert!((-3..=3).contains(&offset));
    }
}

#[test]
fn counter_resets_on_every_fit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut optimizer = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .maximizer(NeverConverges { calls })
        .n_restarts_optimizer(1)
        .seed(6)
        .build()
        .unwrap();

    let (x, y) = line_data(5);
    optimizer.fit(x.clone(), y.clone(), None, None, 3, None).unwrap();
    assert_eq!(optimizer.non_convergence_count(), 2);

    // The history is kept, so iteration 0 of the second call is the only
    // one that skips the surrogate.
    optimizer.fit(x, y, None, None, 2, None).unwrap();
    assert_eq!(optimizer.non_convergence_count(), 1);
    assert_eq!(optimizer.history().len(), 5);
}
