//! Random draws shared by sampling, annealing and surrogate restarts.

/// Draws uniformly from `[low, high)`.
#[inline]
pub(crate) fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Draws a symmetric offset from `[-radius, radius)`.
#[inline]
pub(crate) fn jitter(rng: &mut fastrand::Rng, radius: f64) -> f64 {
    uniform(rng, -radius, radius)
}
