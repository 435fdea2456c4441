//! Calibration samples and incremental session collection.

use serde::{Deserialize, Serialize};

use crate::error::GazeError;
use crate::fit::{fit_gaze_model_with_report, FitConfig, FitReport};
use crate::model::GazeModel;

/// One observed (pupil-glint offset, known screen point) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub delta_x: f64,
    pub delta_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
}

impl CalibrationSample {
    pub fn new(delta_x: f64, delta_y: f64, screen_x: f64, screen_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            screen_x,
            screen_y,
        }
    }

    /// Returns `true` when all four values are finite.
    pub fn is_finite(&self) -> bool {
        self.delta_x.is_finite()
            && self.delta_y.is_finite()
            && self.screen_x.is_finite()
            && self.screen_y.is_finite()
    }
}

impl From<(f64, f64, f64, f64)> for CalibrationSample {
    fn from((dx, dy, sx, sy): (f64, f64, f64, f64)) -> Self {
        Self::new(dx, dy, sx, sy)
    }
}

/// Collects calibration points while the subject fixates known targets,
/// then fits a [`GazeModel`] from everything gathered.
#[derive(Debug, Clone, Default)]
pub struct CalibrationSession {
    config: FitConfig,
    samples: Vec<CalibrationSample>,
}

impl CalibrationSession {
    pub fn new(config: FitConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
        }
    }

    /// Record the offset observed while the subject looked at `screen`.
    pub fn add_point(&mut self, delta: [f64; 2], screen: [f64; 2]) {
        self.samples
            .push(CalibrationSample::new(delta[0], delta[1], screen[0], screen[1]));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit the collected samples. The session keeps its samples, so more
    /// points can be added and the fit repeated.
    pub fn fit(&self) -> Result<GazeModel, GazeError> {
        self.fit_with_report().map(|(model, _)| model)
    }

    pub fn fit_with_report(&self) -> Result<(GazeModel, FitReport), GazeError> {
        fit_gaze_model_with_report(&self.samples, &self.config)
    }
}

impl Extend<CalibrationSample> for CalibrationSession {
    fn extend<I: IntoIterator<Item = CalibrationSample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}
