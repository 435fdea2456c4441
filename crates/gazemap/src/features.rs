//! Quadratic feature expansion of a pupil-glint offset.
//!
//! Fitting and prediction both go through [`quadratic_features`]; the column
//! order defined here is what gives fitted coefficients their meaning.

use nalgebra::Vector6;

/// Number of model features (and coefficients per screen axis).
pub const FEATURE_COUNT: usize = 6;

/// Expand `(dx, dy)` into `[dx, dy, dx·dy, dx², dy², 1]`.
#[inline]
pub fn quadratic_features(dx: f64, dy: f64) -> Vector6<f64> {
    Vector6::new(dx, dy, dx * dy, dx * dx, dy * dy, 1.0)
}

/// Evaluate `coeffs · features(dx, dy)`.
#[inline]
pub fn evaluate(coeffs: &Vector6<f64>, dx: f64, dy: f64) -> f64 {
    coeffs.dot(&quadratic_features(dx, dy))
}
