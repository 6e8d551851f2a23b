use bayesopt::History;
use bayesopt::param::ParamValue;
use bayesopt::parameter::ParameterSpec;
use bayesopt::{BayesianOptimizer, SearchSpace};

use crate::common::{LineAdapter, line_data, neg_mse};

fn space() -> SearchSpace {
    SearchSpace::new(vec![
        ParameterSpec::continuous("slope", 0.0, 4.0),
        ParameterSpec::categorical("offset", [-1_i64, 0, 1]),
    ])
    .unwrap()
}

#[test]
fn saved_history_resumes_a_run() {
    let dir = std::env::temp_dir().join(format!("bayesopt-resume-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("history.json");

    let mut first = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .seed(31)
        .build()
        .unwrap();
    let (x, y) = line_data(6);
    first.fit(x.clone(), y.clone(), None, None, 3, None).unwrap();
    first.history().save(&path).unwrap();

    let loaded = History::load(&path).unwrap();
    assert_eq!(&loaded, first.history());

    let mut resumed = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .history(loaded)
        .seed(32)
        .build()
        .unwrap();
    resumed.fit(x, y, None, None, 2, None).unwrap();

    assert_eq!(resumed.history().len(), 5);
    assert_eq!(resumed.history().entries()[..3], first.history().entries()[..]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn foreign_history_is_rejected() {
    let mut history = History::new();
    history.push(1.0, vec![ParamValue::Float(0.5)]);

    let result = BayesianOptimizer::builder(space(), LineAdapter::default(), neg_mse())
        .history(history)
        .build();
    assert!(result.is_err());
}
