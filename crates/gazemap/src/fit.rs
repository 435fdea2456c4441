//! Ridge-regularized least-squares calibration fit.
//!
//! Each screen axis is fitted independently against the same N×6 design
//! matrix `D` of [`quadratic_features`] rows:
//!
//!   coeffs = (DᵀD + λI)⁻¹ Dᵀ target
//!
//! The λI term keeps the 6×6 normal matrix invertible when calibration
//! points are few or collinear.

use nalgebra::{DMatrix, DVector, Vector6};
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSample;
use crate::error::GazeError;
use crate::features::{quadratic_features, FEATURE_COUNT};
use crate::model::{CoefficientVector, GazeModel};

/// Fewer samples than this leave the quadratic model unconstrained.
pub const MIN_CALIBRATION_SAMPLES: usize = 3;

/// Default ridge penalty λ.
pub const DEFAULT_REGULARIZATION: f64 = 1e-6;

/// Calibration fit settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Ridge penalty λ added to the diagonal of DᵀD.
    ///
    /// Larger values stabilize fits from few or collinear points at the cost
    /// of biasing coefficients toward zero. `0.0` gives a plain least-squares
    /// solve, which fails on rank-deficient calibrations.
    pub regularization: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            regularization: DEFAULT_REGULARIZATION,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), GazeError> {
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(GazeError::InvalidInput(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}

/// Residual statistics for one axis over the calibration samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisResiduals {
    /// Root-mean-square residual in screen units.
    pub rms: f64,
    /// Largest absolute residual in screen units.
    pub max_abs: f64,
}

impl AxisResiduals {
    fn from_residuals(residuals: impl Iterator<Item = f64>) -> Self {
        let mut n = 0usize;
        let mut sum_sq = 0.0f64;
        let mut max_abs = 0.0f64;
        for r in residuals {
            n += 1;
            sum_sq += r * r;
            max_abs = max_abs.max(r.abs());
        }
        if n == 0 {
            return Self::default();
        }
        Self {
            rms: (sum_sq / n as f64).sqrt(),
            max_abs,
        }
    }
}

/// Diagnostics describing how well a fitted model reproduces its own
/// calibration points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub n_samples: usize,
    pub regularization: f64,
    pub residuals_x: AxisResiduals,
    pub residuals_y: AxisResiduals,
}

/// Fit a [`GazeModel`] from calibration samples.
///
/// The input slice is only read. Results are bit-identical for identical
/// input sequences.
pub fn fit_gaze_model(
    samples: &[CalibrationSample],
    config: &FitConfig,
) -> Result<GazeModel, GazeError> {
    fit_gaze_model_with_report(samples, config).map(|(model, _)| model)
}

/// Like [`fit_gaze_model`], also returning residual diagnostics.
pub fn fit_gaze_model_with_report(
    samples: &[CalibrationSample],
    config: &FitConfig,
) -> Result<(GazeModel, FitReport), GazeError> {
    config.validate()?;
    validate_samples(samples)?;

    let dx: Vec<f64> = samples.iter().map(|s| s.delta_x).collect();
    let dy: Vec<f64> = samples.iter().map(|s| s.delta_y).collect();
    let sx: Vec<f64> = samples.iter().map(|s| s.screen_x).collect();
    let sy: Vec<f64> = samples.iter().map(|s| s.screen_y).collect();

    let design = build_design_matrix(&dx, &dy);
    let solver = ridge_solver(&design, config.regularization)?;

    let coeffs_x = solve_axis(&solver, &sx)?;
    let coeffs_y = solve_axis(&solver, &sy)?;
    let model = GazeModel::new(coeffs_x, coeffs_y);

    let report = FitReport {
        n_samples: samples.len(),
        regularization: config.regularization,
        residuals_x: AxisResiduals::from_residuals(
            samples
                .iter()
                .map(|s| model.coeffs_x.evaluate(s.delta_x, s.delta_y) - s.screen_x),
        ),
        residuals_y: AxisResiduals::from_residuals(
            samples
                .iter()
                .map(|s| model.coeffs_y.evaluate(s.delta_x, s.delta_y) - s.screen_y),
        ),
    };

    tracing::debug!(
        n_samples = report.n_samples,
        lambda = report.regularization,
        rms_x = report.residuals_x.rms,
        rms_y = report.residuals_y.rms,
        "fitted gaze model"
    );

    Ok((model, report))
}

fn validate_samples(samples: &[CalibrationSample]) -> Result<(), GazeError> {
    if samples.len() < MIN_CALIBRATION_SAMPLES {
        return Err(GazeError::InsufficientData {
            needed: MIN_CALIBRATION_SAMPLES,
            got: samples.len(),
        });
    }
    if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
        return Err(GazeError::InvalidInput(format!(
            "calibration sample {} contains a non-finite value",
            i
        )));
    }
    Ok(())
}

/// Stack one feature row per sample into an N×6 matrix.
fn build_design_matrix(dx: &[f64], dy: &[f64]) -> DMatrix<f64> {
    let n = dx.len();
    let mut d = DMatrix::<f64>::zeros(n, FEATURE_COUNT);
    for (i, (&x, &y)) in dx.iter().zip(dy).enumerate() {
        for (j, v) in quadratic_features(x, y).iter().enumerate() {
            d[(i, j)] = *v;
        }
    }
    d
}

/// Compute the 6×N matrix (DᵀD + λI)⁻¹ Dᵀ shared by both axes.
fn ridge_solver(design: &DMatrix<f64>, lambda: f64) -> Result<DMatrix<f64>, GazeError> {
    let dt = design.transpose();
    let regularization = DMatrix::from_diagonal_element(FEATURE_COUNT, FEATURE_COUNT, lambda);
    let normal = &dt * design + regularization;
    let normal_inv = normal.try_inverse().ok_or(GazeError::SingularMatrix)?;
    Ok(normal_inv * dt)
}

fn solve_axis(solver: &DMatrix<f64>, target: &[f64]) -> Result<CoefficientVector, GazeError> {
    let coeffs = solver * DVector::from_column_slice(target);
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(GazeError::SingularMatrix);
    }
    Ok(Vector6::from_iterator(coeffs.iter().copied()).into())
}
