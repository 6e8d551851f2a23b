use core::cell::Cell;

use bayesopt::kernel::Kernel;
use bayesopt::maximizer::{
    AnnealingConfig, DEFAULT_GRID_THRESHOLD, DEFAULT_STEP_FRACTION, DEFAULT_STEPS, DEFAULT_T_MAX,
    DEFAULT_T_MIN, strategy_for,
};
use bayesopt::parameter::ParameterSpec;
use bayesopt::surrogate::GaussianProcess;
use bayesopt::{AcquisitionFunction, SearchSpace};

fn config() -> AnnealingConfig {
    AnnealingConfig {
        steps: 500,
        ..AnnealingConfig::default()
    }
}

#[test]
fn annealing_defaults_come_from_the_exported_constants() {
    let defaults = AnnealingConfig::default();
    assert_eq!(defaults.steps, DEFAULT_STEPS);
    assert!((defaults.t_max - DEFAULT_T_MAX).abs() < f64::EPSILON);
    assert!((defaults.t_min - DEFAULT_T_MIN).abs() < f64::EPSILON);
    assert!((defaults.step_fraction - DEFAULT_STEP_FRACTION).abs() < f64::EPSILON);
    assert!(DEFAULT_T_MIN < DEFAULT_T_MAX);
}

#[test]
fn categorical_grid_visits_every_combination_once() {
    let space = SearchSpace::new(vec![
        ParameterSpec::categorical("kernel", ["linear", "rbf", "poly"]),
        ParameterSpec::categorical("degree", [2_i64, 3, 4]),
    ])
    .unwrap();
    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), Some(1));

    let calls = Cell::new(0);
    let utility = |x: &[f64]| {
        calls.set(calls.get() + 1);
        -(x[0] - 1.0).abs() - (x[1] - 2.0).abs()
    };
    let result = maximizer.maximize(&utility, &[0.0, 0.0]).unwrap();

    assert_eq!(calls.get(), 9);
    assert!(result.success);
    assert_eq!(result.x, vec![1.0, 2.0]);
    assert_eq!(space.decode(&result.x).unwrap()[0].to_string(), "rbf");
}

#[test]
fn large_categorical_grid_is_annealed() {
    let space = SearchSpace::new(vec![
        ParameterSpec::categorical("a", 0..10_i64),
        ParameterSpec::categorical("b", 0..10_i64),
    ])
    .unwrap();
    let maximizer = strategy_for(&space, 50, &config(), Some(4));

    let calls = Cell::new(0);
    let utility = |x: &[f64]| {
        calls.set(calls.get() + 1);
        -(x[0] - 7.0).powi(2) - (x[1] - 3.0).powi(2)
    };
    let result = maximizer.maximize(&utility, &[0.0, 0.0]).unwrap();

    // One call for the start and one per step, never the 100-point grid.
    assert_eq!(calls.get(), 501);
    assert!(result.x.iter().all(|v| v.fract() == 0.0 && (0.0..10.0).contains(v)));
    assert!(result.value >= utility(&[0.0, 0.0]));
}

#[test]
fn numeric_space_climbs_to_the_peak() {
    let space = SearchSpace::new(vec![
        ParameterSpec::continuous("lr", 0.0, 1.0),
        ParameterSpec::continuous("momentum", -1.0, 1.0),
    ])
    .unwrap();
    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), None);

    let peak = |x: &[f64]| -(x[0] - 0.3).powi(2) - (x[1] + 0.4).powi(2);
    let result = maximizer.maximize(&peak, &[0.9, 0.9]).unwrap();

    assert!(result.success);
    assert!((result.x[0] - 0.3).abs() < 1e-3);
    assert!((result.x[1] + 0.4).abs() < 1e-3);
}

#[test]
fn numeric_peak_outside_the_box_lands_on_the_bound() {
    let space = SearchSpace::new(vec![ParameterSpec::continuous("x", 0.0, 1.0)]).unwrap();
    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), None);

    let result = maximizer.maximize(&|x| -(x[0] - 3.0).powi(2), &[0.2]).unwrap();
    assert!((result.x[0] - 1.0).abs() < 1e-3);
}

#[test]
fn mixed_space_keeps_categories_valid() {
    let space = SearchSpace::new(vec![
        ParameterSpec::continuous("alpha", 0.0, 2.0),
        ParameterSpec::integer("depth", 1, 8),
        ParameterSpec::categorical("loss", ["l1", "l2", "huber"]),
    ])
    .unwrap();
    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), Some(12));

    let utility = |x: &[f64]| -(x[0] - 1.5).powi(2) - (x[1] - 6.0).powi(2) + x[2];
    let start = [0.0, 1.0, 0.0];
    let result = maximizer.maximize(&utility, &start).unwrap();

    assert!(result.success);
    assert!(result.value >= utility(&start));
    assert!((0.0..=2.0).contains(&result.x[0]));
    assert_eq!(result.x[1].fract(), 0.0);
    assert!((1.0..=8.0).contains(&result.x[1]));
    assert!([0.0, 1.0, 2.0].contains(&result.x[2]));
}

#[test]
fn wrong_start_length_is_an_error() {
    let space = SearchSpace::new(vec![ParameterSpec::continuous("x", 0.0, 1.0)]).unwrap();
    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), None);
    assert!(maximizer.maximize(&|_| 0.0, &[0.1, 0.2]).is_err());
}

#[test]
fn expected_improvement_on_a_fitted_surrogate() {
    let space = SearchSpace::new(vec![ParameterSpec::continuous("x", -2.0, 2.0)]).unwrap();
    let xs: Vec<Vec<f64>> = vec![vec![-2.0], vec![-1.0], vec![0.5], vec![2.0]];
    let ys: Vec<f64> = xs.iter().map(|x| -(x[0] - 0.8).powi(2)).collect();

    let mut gp = GaussianProcess::new(Kernel::select(&space)).seed(5);
    let posterior = gp.fit(&xs, &ys).unwrap();
    let best = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bound = AcquisitionFunction::ExpectedImprovement.bind(&posterior, best);
    let acquisition = |x: &[f64]| bound.value(x);

    let maximizer = strategy_for(&space, DEFAULT_GRID_THRESHOLD, &config(), None);
    let start = [-1.5];
    let result = maximizer.maximize(&acquisition, &start).unwrap();

    assert!((-2.0..=2.0).contains(&result.x[0]));
    assert!(result.value >= acquisition(&start));
    assert!(result.value >= 0.0);
}
