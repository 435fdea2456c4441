//! Fitted per-axis coefficients and the pure (unsmoothed) gaze mapping.

use nalgebra::Vector6;
use serde::{Deserialize, Serialize};

use crate::features::{self, FEATURE_COUNT};

/// Six regression coefficients for one screen axis, in
/// [`quadratic_features`](crate::features::quadratic_features) order.
///
/// Serializes as a plain JSON array of six numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; FEATURE_COUNT]", into = "[f64; FEATURE_COUNT]")]
pub struct CoefficientVector(Vector6<f64>);

impl CoefficientVector {
    pub fn new(coeffs: [f64; FEATURE_COUNT]) -> Self {
        Self(Vector6::from(coeffs))
    }

    pub fn as_vector(&self) -> &Vector6<f64> {
        &self.0
    }

    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        self.0.into()
    }

    /// Returns `true` when every coefficient is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Evaluate this axis at a pupil-glint offset.
    #[inline]
    pub fn evaluate(&self, dx: f64, dy: f64) -> f64 {
        features::evaluate(&self.0, dx, dy)
    }
}

impl From<Vector6<f64>> for CoefficientVector {
    fn from(v: Vector6<f64>) -> Self {
        Self(v)
    }
}

impl From<[f64; FEATURE_COUNT]> for CoefficientVector {
    fn from(a: [f64; FEATURE_COUNT]) -> Self {
        Self::new(a)
    }
}

impl From<CoefficientVector> for [f64; FEATURE_COUNT] {
    fn from(c: CoefficientVector) -> Self {
        c.to_array()
    }
}

/// A fitted calibration: one coefficient vector per screen axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeModel {
    pub coeffs_x: CoefficientVector,
    pub coeffs_y: CoefficientVector,
}

impl GazeModel {
    pub fn new(coeffs_x: CoefficientVector, coeffs_y: CoefficientVector) -> Self {
        Self { coeffs_x, coeffs_y }
    }

    /// Returns `true` when both axes hold only finite coefficients.
    pub fn is_finite(&self) -> bool {
        self.coeffs_x.is_finite() && self.coeffs_y.is_finite()
    }

    /// Raw screen point for an offset, before clamping or smoothing.
    #[inline]
    pub fn predict_raw(&self, dx: f64, dy: f64) -> [f64; 2] {
        [self.coeffs_x.evaluate(dx, dy), self.coeffs_y.evaluate(dx, dy)]
    }
}
