//! gazemap — map pupil-glint offsets to screen gaze points.
//!
//! Two stages:
//!
//! 1. **Fit** – a one-shot ridge regression of screen X and Y on the quadratic
//!    features `[dx, dy, dx·dy, dx², dy², 1]` of calibration samples.
//! 2. **Predict** – per tracking sample, evaluate the fitted model, clamp to
//!    the screen and exponentially smooth toward the result.
//!
//! # Example
//!
//! ```
//! use gazemap::{CalibrationSample, FitConfig, GazePredictor, PredictorConfig};
//!
//! let samples = [
//!     CalibrationSample::new(10.0, 5.0, 100.0, 200.0),
//!     CalibrationSample::new(20.0, 10.0, 300.0, 400.0),
//!     CalibrationSample::new(30.0, 15.0, 500.0, 600.0),
//!     CalibrationSample::new(40.0, 20.0, 700.0, 800.0),
//! ];
//! let mut predictor =
//!     GazePredictor::fit(&samples, &FitConfig::default(), PredictorConfig::default())?;
//! let [x, y] = predictor.predict(25.0, 12.0)?;
//! assert!(x <= 1900.0 && y <= 1000.0);
//! # Ok::<(), gazemap::GazeError>(())
//! ```

mod calibration;
mod error;
mod features;
mod fit;
mod model;
mod predictor;

pub use calibration::{CalibrationSample, CalibrationSession};
pub use error::GazeError;
pub use features::{quadratic_features, FEATURE_COUNT};
pub use fit::{
    fit_gaze_model, fit_gaze_model_with_report, AxisResiduals, FitConfig, FitReport,
    DEFAULT_REGULARIZATION, MIN_CALIBRATION_SAMPLES,
};
pub use model::{CoefficientVector, GazeModel};
pub use predictor::{GazePredictor, PredictorConfig, SmoothingState};
