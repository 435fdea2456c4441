//! Error type shared by calibration fitting and gaze prediction.

/// Failures surfaced by [`fit_gaze_model`](crate::fit_gaze_model) and
/// [`GazePredictor`](crate::GazePredictor).
///
/// None of these are recoverable by retrying with the same inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum GazeError {
    /// Calibration samples or configuration values that cannot be used
    /// (non-finite numbers, negative regularization, empty screen).
    InvalidInput(String),
    /// Too few calibration samples to constrain the model.
    InsufficientData { needed: usize, got: usize },
    /// The regularized normal-equations matrix could not be inverted.
    SingularMatrix,
    /// Prediction was attempted with missing or non-finite coefficients.
    NotCalibrated,
}

impl std::fmt::Display for GazeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Self::InsufficientData { needed, got } => {
                write!(
                    f,
                    "insufficient calibration data: need {} samples, got {}",
                    needed, got
                )
            }
            Self::SingularMatrix => write!(f, "regularized normal matrix is singular"),
            Self::NotCalibrated => write!(f, "predictor has no valid calibration"),
        }
    }
}

impl std::error::Error for GazeError {}
