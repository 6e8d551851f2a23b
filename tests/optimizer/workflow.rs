use bayesopt::kernel::Kernel;
use bayesopt::maximizer::AnnealingConfig;
use bayesopt::model::{Booster, BoostingAdapter, BoostingTrainer, Dataset};
use bayesopt::param::{CategoryValue, ParamMap, ParamValue};
use bayesopt::parameter::ParameterSpec;
use bayesopt::{AcquisitionFunction, BayesianOptimizer, OptimizationType, SearchSpace};
use nalgebra::{DMatrix, DVector};

use crate::common::{LineAdapter, line_data, neg_mse, number};

fn numeric_space() -> SearchSpace {
    SearchSpace::new(vec![
        ParameterSpec::continuous("slope", 0.0, 4.0),
        ParameterSpec::integer("offset", -3, 3),
    ])
    .unwrap()
}

fn fast_annealing() -> AnnealingConfig {
    AnnealingConfig {
        steps: 300,
        ..AnnealingConfig::default()
    }
}

#[test]
fn numeric_run_records_every_iteration() {
    let mut optimizer = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .seed(42)
        .build()
        .unwrap();
    assert_eq!(optimizer.optimization_type(), OptimizationType::Numerical);
    assert_eq!(optimizer.kernel(), &Kernel::Matern);
    assert_eq!(optimizer.bounds(), vec![(0.0, 4.0), (-3.0, 3.0)]);

    let (x, y) = line_data(8);
    let (best, model) = optimizer.fit(x, y, None, None, 5, None).unwrap();

    let history = optimizer.history();
    assert_eq!(history.len(), 5);
    assert_eq!(optimizer.adapter().calls.get(), 5);

    let running = history.best_so_far();
    assert!(running.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(Some(running[4]), history.best_score());

    for entry in history.entries() {
        let slope = entry.params[0].as_f64().unwrap();
        let offset = entry.params[1].as_i64().unwrap();
        assert!((0.0..=4.0).contains(&slope));
        assert!((-3..=3).contains(&offset));
    }

    assert_eq!(model.0, number(&best, "slope").unwrap());
    assert!(optimizer.last_success().is_some());
}

#[test]
fn numeric_run_improves_on_the_first_guess() {
    let mut optimizer = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .seed(3)
        .build()
        .unwrap();
    let (x, y) = line_data(10);
    let (best, _) = optimizer.fit(x, y, None, None, 15, None).unwrap();

    let history = optimizer.history();
    assert!(history.best_score().unwrap() >= history.entries()[0].score);
    assert!((number(&best, "slope").unwrap() - 2.0).abs() < 1.0);
}

#[test]
fn categorical_run_uses_declared_values() {
    let space = SearchSpace::new(vec![
        ParameterSpec::categorical("slope", [0.5, 1.0, 2.0]),
        ParameterSpec::categorical("offset", [-1_i64, 0, 1]),
    ])
    .unwrap();
    let mut optimizer = BayesianOptimizer::builder(space, LineAdapter::default(), neg_mse())
        .seed(5)
        .build()
        .unwrap();
    assert_eq!(optimizer.optimization_type(), OptimizationType::Categorical);
    assert_eq!(optimizer.kernel(), &Kernel::Hamming);
    assert!(optimizer.bounds().is_empty());

    let (x, y) = line_data(6);
    let (best, _) = optimizer.fit(x, y, None, None, 8, None).unwrap();

    for entry in optimizer.history().entries() {
        assert!(matches!(
            entry.params[0],
            ParamValue::Categorical(CategoryValue::Float(_))
        ));
        assert!(matches!(
            entry.params[1],
            ParamValue::Categorical(CategoryValue::Int(_))
        ));
    }
    assert!(best.contains_key("slope") && best.contains_key("offset"));
}

#[test]
fn mixed_run_uses_weighted_hamming_and_annealing() {
    let space = SearchSpace::new(vec![
        ParameterSpec::continuous("slope", 0.0, 4.0),
        ParameterSpec::categorical("offset", [-1_i64, 0, 1]),
    ])
    .unwrap();
    let mut optimizer = BayesianOptimizer::builder(space, LineAdapter::default(), neg_mse())
        .annealing(fast_annealing())
        .normalize(true)
        .seed(9)
        .build()
        .unwrap();
    assert_eq!(optimizer.optimization_type(), OptimizationType::Mixed);
    assert!(matches!(optimizer.kernel(), Kernel::WeightedHamming { .. }));
    assert_eq!(optimizer.bounds(), vec![(0.0, 4.0)]);

    let (x, y) = line_data(6);
    optimizer.fit(x, y, None, None, 6, None).unwrap();

    assert_eq!(optimizer.history().len(), 6);
    for entry in optimizer.history().entries() {
        let slope = entry.params[0].as_f64().unwrap();
        assert!((0.0..=4.0).contains(&slope));
        assert!(entry.params[1].as_category().is_some());
    }
}

#[test]
fn categorical_weight_reaches_the_mixed_kernel() {
    let space = SearchSpace::new(vec![
        ParameterSpec::continuous("slope", 0.0, 4.0),
        ParameterSpec::categorical("offset", [-1_i64, 0, 1]),
    ])
    .unwrap();
    let mut optimizer = BayesianOptimizer::builder(space, LineAdapter::default(), neg_mse())
        .annealing(fast_annealing())
        .categorical_weight(3.0)
        .seed(4)
        .build()
        .unwrap();
    assert!(matches!(
        optimizer.kernel(),
        Kernel::WeightedHamming { categorical, categorical_weight }
            if *categorical == vec![false, true] && (*categorical_weight - 3.0).abs() < f64::EPSILON
    ));
    assert!((optimizer.config().categorical_weight - 3.0).abs() < f64::EPSILON);

    let (x, y) = line_data(6);
    optimizer.fit(x, y, None, None, 4, None).unwrap();
    assert_eq!(optimizer.history().len(), 4);

    // Spaces without a weighted kernel ignore the setting.
    let numeric = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .categorical_weight(3.0)
        .build()
        .unwrap();
    assert_eq!(numeric.kernel(), &Kernel::Matern);
}

#[test]
fn every_acquisition_function_drives_a_run() {
    let functions = [
        AcquisitionFunction::UpperConfidenceBound,
        AcquisitionFunction::ExpectedImprovement,
        AcquisitionFunction::GeneralizedExpectedImprovement { xi: 0.1 },
        AcquisitionFunction::ProbabilityOfImprovement,
    ];
    for acquisition in functions {
        let mut optimizer =
            BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
                .acquisition(acquisition)
                .n_restarts_optimizer(3)
                .seed(11)
                .build()
                .unwrap();
        let (x, y) = line_data(5);
        optimizer.fit(x, y, None, None, 4, None).unwrap();
        assert_eq!(optimizer.history().len(), 4, "{acquisition}");
    }
}

#[test]
fn same_seed_gives_same_history() {
    let run = || {
        let mut optimizer =
            BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
                .seed(123)
                .build()
                .unwrap();
        let (x, y) = line_data(6);
        optimizer.fit(x, y, None, None, 5, None).unwrap();
        optimizer.history().clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn fit_continues_an_existing_history() {
    let mut optimizer = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .seed(8)
        .build()
        .unwrap();
    let (x, y) = line_data(6);
    optimizer.fit(x.clone(), y.clone(), None, None, 3, None).unwrap();
    optimizer.fit(x, y, None, None, 2, None).unwrap();
    assert_eq!(optimizer.history().len(), 5);
}

#[test]
fn ask_and_tell() {
    let mut optimizer = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .seed(21)
        .build()
        .unwrap();

    for i in 0..4_i32 {
        let params = optimizer.propose().unwrap();
        let slope = params[0].as_f64().unwrap();
        optimizer.record(-(slope - 2.0).powi(2) - f64::from(i), params).unwrap();
    }
    assert_eq!(optimizer.history().len(), 4);

    let bad = vec![ParamValue::Float(1.0)];
    assert!(optimizer.record(0.0, bad).is_err());
    assert_eq!(optimizer.history().len(), 4);
}

#[test]
fn start_values_are_evaluated_first() {
    let start = ParamMap::from([
        ("slope".to_owned(), ParamValue::Float(1.25)),
        ("offset".to_owned(), ParamValue::Int(-2)),
    ]);
    let mut optimizer = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .start_values(start)
        .seed(1)
        .build()
        .unwrap();
    let (x, y) = line_data(4);
    optimizer.fit(x, y, None, None, 2, None).unwrap();

    let first = &optimizer.history().entries()[0].params;
    assert_eq!(first, &vec![ParamValue::Float(1.25), ParamValue::Int(-2)]);
}

#[test]
fn start_values_must_match_the_space() {
    let unknown = ParamMap::from([
        ("slope".to_owned(), ParamValue::Float(1.0)),
        ("offset".to_owned(), ParamValue::Int(0)),
        ("depth".to_owned(), ParamValue::Int(3)),
    ]);
    let result = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .start_values(unknown)
        .build();
    assert!(matches!(result, Err(bayesopt::Error::UnknownParameter(name)) if name == "depth"));

    let outside = ParamMap::from([
        ("slope".to_owned(), ParamValue::Float(9.0)),
        ("offset".to_owned(), ParamValue::Int(0)),
    ]);
    let result = BayesianOptimizer::builder(numeric_space(), LineAdapter::default(), neg_mse())
        .start_values(outside)
        .build();
    assert!(matches!(result, Err(bayesopt::Error::TypeMismatch { .. })));
}

/// Predicts `rounds / 100` everywhere.
struct Stump(usize);

impl Booster for Stump {
    fn predict(&self, x: &DMatrix<f64>) -> bayesopt::Result<DVector<f64>> {
        Ok(DVector::from_element(x.nrows(), self.0 as f64 / 100.0))
    }
}

struct StumpTrainer;

impl BoostingTrainer for StumpTrainer {
    type Booster = Stump;

    fn train(
        &self,
        _params: &ParamMap,
        _train: &Dataset,
        _eval: &Dataset,
        num_rounds: usize,
    ) -> bayesopt::Result<Stump> {
        Ok(Stump(num_rounds))
    }
}

#[test]
fn boosting_run_reads_n_estimators() {
    let space = SearchSpace::new(vec![
        ParameterSpec::integer("n_estimators", 10, 500),
        ParameterSpec::continuous("eta", 0.01, 0.3),
    ])
    .unwrap();
    let mut optimizer =
        BayesianOptimizer::builder(space, BoostingAdapter::new(StumpTrainer), neg_mse())
            .seed(4)
            .build()
            .unwrap();

    let x = DMatrix::zeros(4, 2);
    let y = DVector::from_element(4, 2.5);
    let (best, model) = optimizer.fit(x, y, None, None, 6, None).unwrap();

    assert_eq!(best["n_estimators"].as_i64(), Some(model.num_rounds as i64));
    assert_eq!(optimizer.history().len(), 6);
}
