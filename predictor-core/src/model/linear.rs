//! Linear regressor stored as JSON
//!
//! `intercept + Σ coefficients[i] * features[i]` over the packed vector.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, FEATURE_COUNT};
use super::inference::{InferenceError, ModelFormat, Regressor};

/// On-disk shape of a `.json` artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Feature names in training order, if the exporter recorded them
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    name: String,
}

impl LinearRegressor {
    pub fn new(name: impl Into<String>, intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            intercept,
            coefficients,
            name: name.into(),
        }
    }

    /// Model that ignores its input and always answers `log_value`
    pub fn constant(log_value: f64) -> Self {
        Self::new("constant", log_value, [0.0; FEATURE_COUNT])
    }

    /// Build from a parsed artifact; coefficient count must match the layout
    pub fn from_artifact(name: impl Into<String>, artifact: LinearArtifact) -> Result<Self, String> {
        let coefficients: [f64; FEATURE_COUNT] = artifact.coefficients
            .as_slice()
            .try_into()
            .map_err(|_| format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                artifact.coefficients.len()
            ))?;

        Ok(Self::new(name, artifact.intercept, coefficients))
    }
}

impl Regressor for LinearRegressor {
    fn predict_log(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let dot: f64 = features.to_array()
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum();

        Ok(self.intercept + dot)
    }

    fn format(&self) -> ModelFormat {
        ModelFormat::Linear
    }

    fn name(&self) -> &str {
        &self.name
    }
}
