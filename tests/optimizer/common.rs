use core::cell::Cell;

use bayesopt::model::{Dataset, ModelAdapter, ScoreFn};
use bayesopt::param::{CategoryValue, ParamMap, ParamValue};
use bayesopt::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Reads a numeric parameter whatever its declared kind.
pub fn number(params: &ParamMap, name: &str) -> Option<f64> {
    match params.get(name)? {
        ParamValue::Float(v) | ParamValue::Categorical(CategoryValue::Float(v)) => Some(*v),
        ParamValue::Int(v) | ParamValue::Categorical(CategoryValue::Int(v)) => Some(*v as f64),
        ParamValue::Categorical(_) => None,
    }
}

/// Fits `y = slope * x + offset` by doing nothing: the parameters are the model.
///
/// Counts every training call.
#[derive(Default)]
pub struct LineAdapter {
    pub calls: Cell<usize>,
}

impl ModelAdapter for LineAdapter {
    type Model = (f64, f64);

    fn build(&self, params: &ParamMap) -> Result<(f64, f64)> {
        let slope = number(params, "slope").ok_or(Error::MissingParameter("slope".into()))?;
        Ok((slope, number(params, "offset").unwrap_or(0.0)))
    }

    fn fit_predict(
        &self,
        params: &ParamMap,
        _train: &Dataset,
        test: &Dataset,
    ) -> Result<DVector<f64>> {
        self.calls.set(self.calls.get() + 1);
        let (slope, offset) = self.build(params)?;
        Ok(test.x().column(0).map(|x| slope * x + offset))
    }
}

/// Negative mean squared error.
pub fn neg_mse() -> ScoreFn {
    Box::new(|y: &DVector<f64>, y_pred: &DVector<f64>| {
        -(y - y_pred).norm_squared() / y.len() as f64
    })
}

/// `y = 2x + 1` on `n` points.
pub fn line_data(n: usize) -> (DMatrix<f64>, DVector<f64>) {
    let x = DMatrix::from_fn(n, 1, |i, _| i as f64);
    let y = x.column(0).map(|x| 2.0 * x + 1.0);
    (x, y)
}
