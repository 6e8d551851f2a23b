//! The ordered search space shared by every component of a run.
//!
//! [`SearchSpace`] fixes the canonical coordinate order of the parameter
//! specs. All conversions between the array form ([`ParameterVector`]), the
//! dictionary form ([`ParamMap`]) and the numeric encoding consumed by the
//! surrogate go through it, so every component agrees on which coordinate
//! belongs to which parameter.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::param::{ParamMap, ParamValue, ParameterVector};
use crate::parameter::ParameterSpec;
use crate::types::OptimizationType;

/// An ordered, validated list of parameter specs.
///
/// # Examples
///
/// ```
/// use bayesopt::parameter::ParameterSpec;
/// use bayesopt::{OptimizationType, SearchSpace};
///
/// let space = SearchSpace::new(vec![
///     ParameterSpec::categorical("kernel", ["rbf", "linear"]),
///     ParameterSpec::continuous("c", 0.1, 10.0),
/// ])
/// .unwrap();
///
/// assert_eq!(space.optimization_type(), OptimizationType::Mixed);
/// assert_eq!(space.bounds(), vec![(0.1, 10.0)]);
/// ```
#[derive(Clone, Debug)]
pub struct SearchSpace {
    specs: Vec<ParameterSpec>,
}

impl SearchSpace {
    /// Builds a search space, validating every spec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySpace`] for an empty list,
    /// [`Error::DuplicateName`] when two specs share a name, or the
    /// validation error of the first invalid spec.
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::EmptySpace);
        }
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name()) {
                return Err(Error::DuplicateName(spec.name().to_owned()));
            }
        }
        Ok(Self { specs })
    }

    /// Returns the specs in canonical order.
    #[must_use]
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always `false`: a space holds at least one parameter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Returns the number of categorical parameters.
    #[must_use]
    pub fn n_categorical(&self) -> usize {
        self.specs.iter().filter(|s| s.is_categorical()).count()
    }

    /// Classifies the problem as categorical, numerical or mixed.
    #[must_use]
    pub fn optimization_type(&self) -> OptimizationType {
        OptimizationType::classify(self.n_categorical(), self.specs.len())
    }

    /// Returns one flag per coordinate, `true` where the parameter is categorical.
    #[must_use]
    pub fn categorical_mask(&self) -> Vec<bool> {
        self.specs.iter().map(ParameterSpec::is_categorical).collect()
    }

    /// Returns `(lower, upper)` for the numeric parameters only, in canonical order.
    #[must_use]
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.specs.iter().filter_map(ParameterSpec::bounds).collect()
    }

    /// Converts the array form into the dictionary form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when the vector length differs
    /// from the number of parameters.
    pub fn to_map(&self, params: &[ParamValue]) -> Result<ParamMap> {
        self.check_len(params.len())?;
        Ok(self
            .specs
            .iter()
            .zip(params)
            .map(|(spec, value)| (spec.name().to_owned(), value.clone()))
            .collect())
    }

    /// Converts the dictionary form into the array form, in canonical order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] when a spec has no entry and
    /// [`Error::UnknownParameter`] when the map holds an extra name.
    pub fn to_vector(&self, params: &ParamMap) -> Result<ParameterVector> {
        if let Some(extra) = params
            .keys()
            .find(|name| !self.specs.iter().any(|s| s.name() == name.as_str()))
        {
            return Err(Error::UnknownParameter(extra.clone()));
        }
        self.specs
            .iter()
            .map(|spec| {
                params
                    .get(spec.name())
                    .cloned()
                    .ok_or_else(|| Error::MissingParameter(spec.name().to_owned()))
            })
            .collect()
    }

    /// Encodes a parameter vector into numeric coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when the length differs from the space or a value
    /// does not fit its spec.
    pub fn encode(&self, params: &[ParamValue]) -> Result<Vec<f64>> {
        self.check_len(params.len())?;
        self.specs
            .iter()
            .zip(params)
            .map(|(spec, value)| spec.encode(value))
            .collect()
    }

    /// Decodes numeric coordinates into a typed parameter vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when the length differs from the space.
    pub fn decode(&self, x: &[f64]) -> Result<ParameterVector> {
        self.check_len(x.len())?;
        Ok(self
            .specs
            .iter()
            .zip(x)
            .map(|(spec, &v)| spec.decode(v))
            .collect())
    }

    /// Draws a uniformly random point, already encoded.
    #[must_use]
    pub fn sample_encoded(&self, rng: &mut fastrand::Rng) -> Vec<f64> {
        self.specs.iter().map(|spec| spec.sample(rng)).collect()
    }

    /// Centers and scales the numeric coordinates of an encoded point.
    ///
    /// Each numeric coordinate has half of its declared range subtracted and
    /// is then divided by the range. Coordinates whose range is zero are
    /// shifted but not divided. Categorical coordinates are left untouched.
    pub fn normalize(&self, x: &mut [f64]) {
        for (spec, v) in self.specs.iter().zip(x.iter_mut()) {
            if let Some((lower, upper)) = spec.bounds() {
                let range = upper - lower;
                *v -= range / 2.0;
                if range > 0.0 {
                    *v /= range;
                }
            }
        }
    }

    /// Returns every combination of categorical indices when the space is
    /// fully categorical, in row-major order (last parameter varies fastest).
    ///
    /// Returns `None` for spaces with numeric parameters, and when the grid
    /// would be larger than `limit`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn categorical_grid(&self, limit: usize) -> Option<Vec<Vec<f64>>> {
        let sizes: Vec<usize> = self
            .specs
            .iter()
            .map(|s| s.choices().map(<[_]>::len))
            .collect::<Option<_>>()?;
        let total = grid_size(&sizes)?;
        if total > limit {
            return None;
        }

        let mut grid = Vec::with_capacity(total);
        let mut index = vec![0_usize; sizes.len()];
        for _ in 0..total {
            grid.push(index.iter().map(|&i| i as f64).collect());
            for dim in (0..sizes.len()).rev() {
                index[dim] += 1;
                if index[dim] < sizes[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
        Some(grid)
    }

    /// Returns the number of categorical combinations, or `None` on overflow
    /// or when the space has numeric parameters.
    #[must_use]
    pub fn n_combinations(&self) -> Option<usize> {
        let sizes: Vec<usize> = self
            .specs
            .iter()
            .map(|s| s.choices().map(<[_]>::len))
            .collect::<Option<_>>()?;
        grid_size(&sizes)
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got == self.specs.len() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.specs.len(),
                got,
            })
        }
    }
}

fn grid_size(sizes: &[usize]) -> Option<usize> {
    sizes.iter().try_fold(1_usize, |acc, &n| acc.checked_mul(n))
}
