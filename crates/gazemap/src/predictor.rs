//! Per-sample gaze prediction with screen clamping and exponential smoothing.
//!
//! Each call evaluates the fitted model, clamps the raw point to the screen,
//! then moves the emitted point a fixed fraction of the way toward it:
//!
//!   out = last + (clamped - last) * smoothing_factor
//!
//! The very first prediction is emitted unsmoothed. Clamping happens before
//! smoothing so one wild sample can move the output by at most
//! `smoothing_factor` times the distance to the screen edge.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSample;
use crate::error::GazeError;
use crate::fit::{fit_gaze_model, FitConfig};
use crate::model::GazeModel;

/// Runtime settings for [`GazePredictor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Upper bound for emitted X (display width in screen units).
    pub screen_width: f64,
    /// Upper bound for emitted Y (display height in screen units).
    pub screen_height: f64,
    /// Fraction of the remaining gap closed per sample, in `(0, 1]`.
    ///
    /// Small values give a steady but laggy cursor; `1.0` disables smoothing.
    pub smoothing_factor: f64,
    /// Also clamp raw predictions below at zero.
    pub clamp_to_origin: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            screen_width: 1900.0,
            screen_height: 1000.0,
            smoothing_factor: 0.1,
            clamp_to_origin: false,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<(), GazeError> {
        for (name, v) in [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(GazeError::InvalidInput(format!(
                    "{} must be finite and positive, got {}",
                    name, v
                )));
            }
        }
        let s = self.smoothing_factor;
        if !s.is_finite() || s <= 0.0 || s > 1.0 {
            return Err(GazeError::InvalidInput(format!(
                "smoothing_factor must be in (0, 1], got {}",
                s
            )));
        }
        Ok(())
    }

    /// Clamp a raw model output to the configured screen bounds.
    pub fn clamp(&self, raw: [f64; 2]) -> [f64; 2] {
        let mut x = raw[0].min(self.screen_width);
        let mut y = raw[1].min(self.screen_height);
        if self.clamp_to_origin {
            x = x.max(0.0);
            y = y.max(0.0);
        }
        [x, y]
    }
}

/// Smoothing state of a [`GazePredictor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingState {
    /// No point has been emitted yet.
    Uninitialized,
    /// `last` is the most recently emitted point.
    Tracking { last: [f64; 2] },
}

/// Stateful gaze predictor driven by one sampling loop.
///
/// `predict` takes `&mut self`; share across threads only behind a lock.
#[derive(Debug, Clone)]
pub struct GazePredictor {
    model: GazeModel,
    config: PredictorConfig,
    state: SmoothingState,
}

impl GazePredictor {
    /// Wrap an already fitted model.
    pub fn new(model: GazeModel, config: PredictorConfig) -> Result<Self, GazeError> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            state: SmoothingState::Uninitialized,
        })
    }

    /// Fit a model from calibration samples and wrap it.
    pub fn fit(
        samples: &[CalibrationSample],
        fit_config: &FitConfig,
        config: PredictorConfig,
    ) -> Result<Self, GazeError> {
        let model = fit_gaze_model(samples, fit_config)?;
        Self::new(model, config)
    }

    pub fn model(&self) -> &GazeModel {
        &self.model
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn state(&self) -> SmoothingState {
        self.state
    }

    /// Most recently emitted point, if any.
    pub fn last_output(&self) -> Option<[f64; 2]> {
        match self.state {
            SmoothingState::Uninitialized => None,
            SmoothingState::Tracking { last } => Some(last),
        }
    }

    /// Map one pupil-glint offset to a smoothed, clamped screen point.
    pub fn predict(&mut self, dx: f64, dy: f64) -> Result<[f64; 2], GazeError> {
        if !self.model.is_finite() {
            return Err(GazeError::NotCalibrated);
        }
        if !dx.is_finite() || !dy.is_finite() {
            return Err(GazeError::InvalidInput(format!(
                "non-finite offset ({}, {})",
                dx, dy
            )));
        }

        let raw = self.model.predict_raw(dx, dy);
        if !raw[0].is_finite() || !raw[1].is_finite() {
            return Err(GazeError::InvalidInput(format!(
                "offset ({}, {}) maps outside the model's finite range",
                dx, dy
            )));
        }
        let target = self.config.clamp(raw);

        let out = match self.state {
            SmoothingState::Uninitialized => {
                tracing::debug!(x = target[0], y = target[1], "first gaze point");
                target
            }
            SmoothingState::Tracking { last } => {
                let a = self.config.smoothing_factor;
                [
                    last[0] + (target[0] - last[0]) * a,
                    last[1] + (target[1] - last[1]) * a,
                ]
            }
        };
        self.state = SmoothingState::Tracking { last: out };

        tracing::trace!(dx, dy, raw_x = raw[0], raw_y = raw[1], x = out[0], y = out[1], "gaze");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CoefficientVector;
    use approx::assert_relative_eq;

    /// x = 10·dx, y = 5·dy
    fn linear_model() -> GazeModel {
        GazeModel::new(
            CoefficientVector::new([10.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            CoefficientVector::new([0.0, 5.0, 0.0, 0.0, 0.0, 0.0]),
        )
    }

    fn predictor() -> GazePredictor {
        GazePredictor::new(linear_model(), PredictorConfig::default()).unwrap()
    }

    #[test]
    fn test_first_call_is_unsmoothed() {
        let mut p = predictor();
        assert_eq!(p.state(), SmoothingState::Uninitialized);
        assert_eq!(p.predict(42.0, 17.0).unwrap(), [420.0, 85.0]);
        assert_eq!(p.last_output(), Some([420.0, 85.0]));
    }

    #[test]
    fn test_first_call_clamps_to_screen() {
        let mut p = predictor();
        let out = p.predict(300.0, 900.0).unwrap();
        assert_eq!(out, [1900.0, 1000.0]);

        // Clamped target caps the next step too.
        let next = p.predict(10_000.0, 0.0).unwrap();
        assert_eq!(next[0], 1900.0);
        assert_relative_eq!(next[1], 900.0, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_screen_bounds() {
        let config = PredictorConfig {
            screen_width: 1280.0,
            screen_height: 720.0,
            ..Default::default()
        };
        let mut p = GazePredictor::new(linear_model(), config).unwrap();
        assert_eq!(p.predict(200.0, 200.0).unwrap(), [1280.0, 720.0]);
    }

    #[test]
    fn test_negative_values_pass_unless_clamped_to_origin() {
        let mut p = predictor();
        assert_eq!(p.predict(-5.0, -4.0).unwrap(), [-50.0, -20.0]);

        let config = PredictorConfig {
            clamp_to_origin: true,
            ..Default::default()
        };
        let mut p = GazePredictor::new(linear_model(), config).unwrap();
        assert_eq!(p.predict(-5.0, -4.0).unwrap(), [0.0, 0.0]);
    }

    #[test]
    fn test_smoothing_converges_monotonically() {
        let mut p = predictor();
        p.predict(80.0, 80.0).unwrap();
        let target = [1000.0, 500.0];

        let mut prev = p.last_output().unwrap();
        for _ in 0..10 {
            let out = p.predict(100.0, 100.0).unwrap();
            for axis in 0..2 {
                assert!(out[axis] > prev[axis], "axis {} did not advance", axis);
                assert!(out[axis] <= target[axis], "axis {} overshot", axis);
                // Each step closes exactly a tenth of the remaining gap.
                assert_relative_eq!(
                    target[axis] - out[axis],
                    0.9 * (target[axis] - prev[axis]),
                    max_relative = 1e-12
                );
            }
            prev = out;
        }
        assert_relative_eq!(prev[0], target[0], max_relative = 0.1);
        assert_relative_eq!(prev[1], target[1], max_relative = 0.1);
    }

    #[test]
    fn test_origin_output_does_not_restart_tracking() {
        let mut p = predictor();
        assert_eq!(p.predict(0.0, 0.0).unwrap(), [0.0, 0.0]);
        assert_eq!(p.state(), SmoothingState::Tracking { last: [0.0, 0.0] });

        // Still smoothing: a tenth of the way toward (1000, 500).
        let out = p.predict(100.0, 100.0).unwrap();
        assert_relative_eq!(out[0], 100.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unit_smoothing_tracks_raw() {
        let config = PredictorConfig {
            smoothing_factor: 1.0,
            ..Default::default()
        };
        let mut p = GazePredictor::new(linear_model(), config).unwrap();
        p.predict(10.0, 10.0).unwrap();
        assert_eq!(p.predict(20.0, 30.0).unwrap(), [200.0, 150.0]);
    }

    #[test]
    fn test_non_finite_model_is_not_calibrated() {
        let model = GazeModel::new(
            CoefficientVector::new([f64::NAN; 6]),
            CoefficientVector::new([0.0; 6]),
        );
        let mut p = GazePredictor::new(model, PredictorConfig::default()).unwrap();
        assert_eq!(p.predict(1.0, 1.0).unwrap_err(), GazeError::NotCalibrated);
        assert_eq!(p.state(), SmoothingState::Uninitialized);
    }

    #[test]
    fn test_rejects_bad_config_and_offsets() {
        for config in [
            PredictorConfig {
                screen_width: 0.0,
                ..Default::default()
            },
            PredictorConfig {
                screen_height: f64::INFINITY,
                ..Default::default()
            },
            PredictorConfig {
                smoothing_factor: 0.0,
                ..Default::default()
            },
            PredictorConfig {
                smoothing_factor: 1.5,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                GazePredictor::new(linear_model(), config),
                Err(GazeError::InvalidInput(_))
            ));
        }

        let mut p = predictor();
        assert!(matches!(
            p.predict(f64::NAN, 1.0),
            Err(GazeError::InvalidInput(_))
        ));
        assert_eq!(p.last_output(), None);
    }

    #[test]
    fn test_overflowing_offset_keeps_last_output() {
        let mut p = predictor();
        let first = p.predict(20.0, 40.0).unwrap();

        // dx² overflows to ∞ and the zero cross/square coefficients turn it into NaN.
        assert!(matches!(
            p.predict(-1e308, 1.0),
            Err(GazeError::InvalidInput(_))
        ));
        assert_eq!(p.last_output(), Some(first));

        let next = p.predict(20.0, 40.0).unwrap();
        assert_eq!(next, first);
    }

    #[test]
    fn test_end_to_end_calibration_and_prediction() {
        let samples = [
            CalibrationSample::new(10.0, 5.0, 100.0, 200.0),
            CalibrationSample::new(20.0, 10.0, 300.0, 400.0),
            CalibrationSample::new(30.0, 15.0, 500.0, 600.0),
            CalibrationSample::new(40.0, 20.0, 700.0, 800.0),
        ];
        let mut p =
            GazePredictor::fit(&samples, &FitConfig::default(), PredictorConfig::default())
                .unwrap();
        assert!(p.model().is_finite());

        let [x, y] = p.predict(25.0, 12.0).unwrap();
        assert!((0.0..=1900.0).contains(&x), "x out of bounds: {}", x);
        assert!((0.0..=1000.0).contains(&y), "y out of bounds: {}", y);
    }
}
