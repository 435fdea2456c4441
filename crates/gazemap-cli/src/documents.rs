//! JSON documents read and written by the CLI.

use std::path::Path;

use gazemap::{CalibrationSample, CoefficientVector, FitReport, GazeModel};
use serde::{Deserialize, Serialize};

pub const CALIBRATION_SCHEMA_V1: &str = "gazemap.calibration.v1";
pub const MODEL_SCHEMA_V1: &str = "gazemap.model.v1";

type DocError = Box<dyn std::error::Error>;

/// Calibration samples gathered by an acquisition front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationDocument {
    pub schema: String,
    pub samples: Vec<CalibrationSample>,
}

/// A fitted model plus the diagnostics from its fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    pub schema: String,
    pub coeffs_x: CoefficientVector,
    pub coeffs_y: CoefficientVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<FitReport>,
}

impl ModelDocument {
    pub fn new(model: &GazeModel, report: Option<FitReport>) -> Self {
        Self {
            schema: MODEL_SCHEMA_V1.to_string(),
            coeffs_x: model.coeffs_x,
            coeffs_y: model.coeffs_y,
            report,
        }
    }

    pub fn model(&self) -> GazeModel {
        GazeModel::new(self.coeffs_x, self.coeffs_y)
    }
}

fn check_schema(found: &str, expected: &str, path: &Path) -> Result<(), DocError> {
    if found != expected {
        return Err(format!(
            "{}: unsupported schema '{}', expected '{}'",
            path.display(),
            found,
            expected
        )
        .into());
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DocError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| -> DocError { format!("failed to read {}: {}", path.display(), e).into() })?;
    serde_json::from_str(&text)
        .map_err(|e| -> DocError { format!("failed to parse {}: {}", path.display(), e).into() })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DocError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_calibration(path: &Path) -> Result<CalibrationDocument, DocError> {
    let doc: CalibrationDocument = read_json(path)?;
    check_schema(&doc.schema, CALIBRATION_SCHEMA_V1, path)?;
    Ok(doc)
}

pub fn load_model(path: &Path) -> Result<ModelDocument, DocError> {
    let doc: ModelDocument = read_json(path)?;
    check_schema(&doc.schema, MODEL_SCHEMA_V1, path)?;
    Ok(doc)
}

/// Delta sequences are bare `[[dx, dy], ...]` arrays.
pub fn load_deltas(path: &Path) -> Result<Vec<[f64; 2]>, DocError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_document_parses_samples() {
        let json = r#"{
            "schema": "gazemap.calibration.v1",
            "samples": [
                {"delta_x": 10.0, "delta_y": 5.0, "screen_x": 100.0, "screen_y": 200.0},
                {"delta_x": 20.0, "delta_y": 10.0, "screen_x": 300.0, "screen_y": 400.0}
            ]
        }"#;
        let doc: CalibrationDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.samples.len(), 2);
        assert_eq!(doc.samples[1], CalibrationSample::new(20.0, 10.0, 300.0, 400.0));
    }

    #[test]
    fn model_document_roundtrips_coefficients() {
        let model = GazeModel::new(
            CoefficientVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            CoefficientVector::new([-1.0, 0.5, 0.0, 0.25, 0.0, 540.0]),
        );
        let doc = ModelDocument::new(&model, None);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("report"), "{}", json);

        let back: ModelDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schema, MODEL_SCHEMA_V1);
        assert_eq!(back.model(), model);
    }

    #[test]
    fn wrong_schema_is_rejected() {
        let err = check_schema("gazemap.model.v0", MODEL_SCHEMA_V1, Path::new("m.json"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("unsupported schema"), "{}", err);
    }
}
