//! Simulated annealing over mixed discrete and continuous coordinates.
//!
//! The annealer minimizes the energy `-acquisition(x)`. Each step perturbs a
//! single randomly chosen coordinate: a categorical coordinate is resampled
//! to a different category, a numeric coordinate moves uniformly within a
//! fraction of its range and is clamped into bounds (integer coordinates are
//! rounded). Worse moves are accepted with probability `exp(-Δ / T)`, where
//! the temperature `T` cools geometrically from `t_max` to `t_min`.

use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{AcquisitionMaximizer, Maximum, check_len};
use crate::error::Result;
use crate::parameter::ParamKind;
use crate::rng_util;
use crate::space::SearchSpace;

/// Default number of annealing steps.
pub const DEFAULT_STEPS: usize = 1000;
/// Default starting temperature.
pub const DEFAULT_T_MAX: f64 = 1.0;
/// Default final temperature.
pub const DEFAULT_T_MIN: f64 = 1e-3;
/// Default numeric step as a fraction of the parameter range.
pub const DEFAULT_STEP_FRACTION: f64 = 0.1;

/// Schedule and move size of the annealer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnealingConfig {
    /// Number of proposed moves.
    pub steps: usize,
    /// Temperature of the first step.
    pub t_max: f64,
    /// Temperature of the last step.
    pub t_min: f64,
    /// Largest numeric move, as a fraction of the coordinate's range.
    pub step_fraction: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            t_max: DEFAULT_T_MAX,
            t_min: DEFAULT_T_MIN,
            step_fraction: DEFAULT_STEP_FRACTION,
        }
    }
}

#[derive(Clone, Debug)]
enum Coordinate {
    Numeric { lower: f64, upper: f64, integer: bool },
    Categorical { n_values: usize },
}

impl Coordinate {
    fn can_move(&self) -> bool {
        match *self {
            Self::Numeric { lower, upper, .. } => upper > lower,
            Self::Categorical { n_values } => n_values > 1,
        }
    }
}

/// Simulated-annealing maximizer for mixed and large categorical spaces.
///
/// # Examples
///
/// ```
/// use bayesopt::SearchSpace;
/// use bayesopt::maximizer::{AcquisitionMaximizer, AnnealingConfig, AnnealingMaximizer};
/// use bayesopt::parameter::ParameterSpec;
///
/// let space = SearchSpace::new(vec![
///     ParameterSpec::categorical("kind", ["a", "b", "c"]),
///     ParameterSpec::continuous("x", 0.0, 1.0),
/// ])
/// .unwrap();
/// let annealer = AnnealingMaximizer::new(&space, AnnealingConfig::default(), Some(7));
///
/// let utility = |x: &[f64]| if x[0] == 2.0 { 1.0 - (x[1] - 0.5).abs() } else { 0.0 };
/// let result = annealer.maximize(&utility, &[0.0, 0.0]).unwrap();
/// assert!(result.success);
/// assert_eq!(result.x[0], 2.0);
/// ```
pub struct AnnealingMaximizer {
    coordinates: Vec<Coordinate>,
    config: AnnealingConfig,
    rng: Mutex<fastrand::Rng>,
}

impl AnnealingMaximizer {
    /// Creates an annealer over the coordinates of `space`.
    ///
    /// Without a seed the generator is seeded randomly.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(space: &SearchSpace, config: AnnealingConfig, seed: Option<u64>) -> Self {
        let coordinates = space
            .specs()
            .iter()
            .map(|spec| match spec.kind() {
                ParamKind::Continuous { lower, upper } => Coordinate::Numeric {
                    lower: *lower,
                    upper: *upper,
                    integer: false,
                },
                ParamKind::Integer { lower, upper } => Coordinate::Numeric {
                    lower: *lower as f64,
                    upper: *upper as f64,
                    integer: true,
                },
                ParamKind::Categorical { values } => Coordinate::Categorical {
                    n_values: values.len(),
                },
            })
            .collect();
        let rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self {
            coordinates,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Returns the annealing schedule.
    #[must_use]
    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    #[allow(clippy::cast_precision_loss)]
    fn temperature(&self, step: usize) -> f64 {
        let AnnealingConfig {
            steps, t_max, t_min, ..
        } = self.config;
        if steps <= 1 {
            return t_max;
        }
        let progress = step as f64 / (steps - 1) as f64;
        t_max * (t_min / t_max).powf(progress)
    }

    #[allow(clippy::cast_precision_loss)]
    fn perturb(&self, rng: &mut fastrand::Rng, x: &mut [f64], movable: &[usize]) {
        let dim = movable[rng.usize(0..movable.len())];
        match self.coordinates[dim] {
            Coordinate::Categorical { n_values } => {
                // shift by 1..n_values so the category always changes
                let current = x[dim].round().max(0.0);
                let shift = rng.usize(1..n_values) as f64;
                x[dim] = (current + shift) % n_values as f64;
            }
            Coordinate::Numeric {
                lower,
                upper,
                integer,
            } => {
                let radius = self.config.step_fraction * (upper - lower);
                let mut v = x[dim] + rng_util::jitter(rng, radius);
                if integer {
                    v = v.round();
                }
                x[dim] = v.clamp(lower, upper);
            }
        }
    }
}

impl AcquisitionMaximizer for AnnealingMaximizer {
    fn maximize(&self, acquisition: &dyn Fn(&[f64]) -> f64, start: &[f64]) -> Result<Maximum> {
        check_len(self.coordinates.len(), start.len())?;

        let energy = |x: &[f64]| -acquisition(x);
        let movable: Vec<usize> = self
            .coordinates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.can_move())
            .map(|(i, _)| i)
            .collect();

        let mut current = start.to_vec();
        let mut current_energy = energy(&current);
        let mut best = current.clone();
        let mut best_energy = current_energy;

        if !movable.is_empty() {
            let mut rng = self.rng.lock();
            for step in 0..self.config.steps {
                let temperature = self.temperature(step);
                let mut candidate = current.clone();
                self.perturb(&mut rng, &mut candidate, &movable);
                let candidate_energy = energy(&candidate);

                let accept = if candidate_energy.is_nan() {
                    current_energy.is_nan()
                } else if current_energy.is_nan() || candidate_energy <= current_energy {
                    true
                } else {
                    let delta = candidate_energy - current_energy;
                    rng.f64() < (-delta / temperature).exp()
                };
                if !accept {
                    continue;
                }

                current = candidate;
                current_energy = candidate_energy;
                if best_energy.is_nan() || current_energy < best_energy {
                    best.clone_from(&current);
                    best_energy = current_energy;
                }
            }
        }

        trace_debug!(
            steps = self.config.steps,
            best = -best_energy,
            "annealing finished"
        );

        Ok(Maximum {
            success: !best_energy.is_nan(),
            x: best,
            value: -best_energy,
        })
    }
}
