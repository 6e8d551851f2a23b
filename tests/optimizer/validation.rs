use bayesopt::evaluation::Validation;
use bayesopt::model::Dataset;
use bayesopt::parameter::ParameterSpec;
use bayesopt::{BayesianOptimizer, Error, SearchSpace};
use nalgebra::{DMatrix, DVector};

use crate::common::{LineAdapter, line_data, neg_mse};

fn optimizer() -> BayesianOptimizer<LineAdapter> {
    let space = SearchSpace::new(vec![ParameterSpec::continuous("slope", 0.0, 4.0)]).unwrap();
    BayesianOptimizer::builder(space, LineAdapter::default(), neg_mse())
        .seed(10)
        .build()
        .unwrap()
}

#[test]
fn half_a_test_set_is_rejected_before_any_evaluation() {
    let mut optimizer = optimizer();
    let (x, y) = line_data(6);
    let (x_test, y_test) = line_data(3);

    let result = optimizer.fit(x.clone(), y.clone(), Some(x_test), None, 3, None);
    assert!(matches!(result, Err(Error::MissingValue)));

    let result = optimizer.fit(x, y, None, Some(y_test), 3, Some(2));
    assert!(matches!(result, Err(Error::MissingValue)));

    assert_eq!(optimizer.adapter().calls.get(), 0);
    assert!(optimizer.history().is_empty());
}

#[test]
fn test_targets_without_features_or_folds_are_rejected() {
    let mut optimizer = optimizer();
    let (x, y) = line_data(6);
    let (_, y_test) = line_data(3);

    let result = optimizer.fit(x, y, None, Some(y_test), 3, None);
    assert!(matches!(result, Err(Error::MissingValue)));
    assert_eq!(optimizer.adapter().calls.get(), 0);
    assert!(optimizer.history().is_empty());
}

#[test]
fn test_set_and_folds_conflict() {
    let mut optimizer = optimizer();
    let (x, y) = line_data(6);
    let (x_test, y_test) = line_data(3);

    let result = optimizer.fit(x, y, Some(x_test), Some(y_test), 3, Some(3));
    assert!(matches!(result, Err(Error::ConflictingValidation)));
    assert_eq!(optimizer.adapter().calls.get(), 0);
}

#[test]
fn unusable_fold_counts() {
    let mut optimizer = optimizer();
    for n_folds in [0, 1, 7] {
        let (x, y) = line_data(6);
        let result = optimizer.fit(x, y, None, None, 2, Some(n_folds));
        assert!(
            matches!(result, Err(Error::InvalidFolds { n_samples: 6, .. })),
            "{n_folds} folds"
        );
    }
    assert!(optimizer.history().is_empty());
}

#[test]
fn mismatched_training_data() {
    let mut optimizer = optimizer();
    let x = DMatrix::zeros(4, 1);
    let y = DVector::zeros(3);
    assert!(matches!(
        optimizer.fit(x, y, None, None, 2, None),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn hold_out_set_is_scored() {
    let mut optimizer = optimizer();
    let (x, y) = line_data(6);
    let (x_test, y_test) = line_data(3);
    optimizer
        .fit(x, y, Some(x_test), Some(y_test), 3, None)
        .unwrap();

    // One training per iteration.
    assert_eq!(optimizer.adapter().calls.get(), 3);
}

#[test]
fn cross_validation_averages_fold_scores() {
    let space = SearchSpace::new(vec![ParameterSpec::continuous("slope", 0.0, 4.0)]).unwrap();
    let fold_size = Box::new(|y: &DVector<f64>, _: &DVector<f64>| y.len() as f64);
    let mut optimizer = BayesianOptimizer::builder(space, LineAdapter::default(), fold_size)
        .seed(10)
        .build()
        .unwrap();

    let (x, y) = line_data(7);
    optimizer.fit(x, y, None, None, 2, Some(3)).unwrap();

    assert_eq!(optimizer.adapter().calls.get(), 6);
    for entry in optimizer.history().entries() {
        assert!((entry.score - 7.0 / 3.0).abs() < 1e-12);
    }
}

#[test]
fn validation_is_resolved_in_order() {
    let train = Dataset::from_rows(&[vec![1.0], vec![2.0], vec![3.0]], vec![1.0, 2.0, 3.0]).unwrap();
    let x_test = DMatrix::zeros(1, 1);

    assert_eq!(
        Validation::new(&train, None, None, None).unwrap(),
        Validation::TrainingSet
    );
    assert!(matches!(
        Validation::new(&train, Some(x_test.clone()), None, Some(9)),
        Err(Error::MissingValue)
    ));
    assert!(matches!(
        Validation::new(&train, Some(DMatrix::zeros(1, 2)), Some(DVector::zeros(1)), None),
        Err(Error::DimensionMismatch { expected: 1, got: 2 })
    ));
    assert!(matches!(
        Validation::new(&train, Some(x_test), Some(DVector::zeros(1)), None),
        Ok(Validation::HoldOut(_))
    ));
}

#[test]
fn results_need_a_history() {
    let mut optimizer = optimizer();
    assert!(matches!(optimizer.best_params(), Err(Error::NoHistory)));

    let (x, y) = line_data(4);
    assert!(matches!(
        optimizer.fit(x, y, None, None, 0, None),
        Err(Error::NoHistory)
    ));
}
