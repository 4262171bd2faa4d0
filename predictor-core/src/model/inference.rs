//! Inference Engine - Regressor seam + ONNX Runtime implementation
//!
//! The predictor only sees [`Regressor`]; the concrete artifact format stays
//! behind it so a model can be swapped without touching prediction logic.

use std::path::Path;

use ndarray::Array2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Failure inside a single model call
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("Inference failed: {0}")]
    Runtime(String),

    #[error("Model produced no output")]
    NoOutput,
}

// ============================================================================
// REGRESSOR TRAIT
// ============================================================================

/// Serialized artifact formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Linear,
}

impl ModelFormat {
    /// Pick a format from the artifact's file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(Self::Onnx),
            "json" => Some(Self::Linear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Linear => "linear",
        }
    }
}

/// A pre-trained regression model.
///
/// `predict_log` returns the raw model output, which is on the log1p scale
/// of the training target.
pub trait Regressor: Send + Sync {
    fn predict_log(&self, features: &FeatureVector) -> Result<f64, InferenceError>;
    fn format(&self) -> ModelFormat;
    fn name(&self) -> &str;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// ONNX graph with a single `[1, FEATURE_COUNT]` float input.
///
/// `Session::run` needs `&mut`, so calls are serialized on a mutex.
pub struct OnnxRegressor {
    session: Mutex<Session>,
    output_name: String,
    name: String,
}

impl std::fmt::Debug for OnnxRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRegressor")
            .field("name", &self.name)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl OnnxRegressor {
    /// Build a session from model bytes
    pub fn from_bytes(name: impl Into<String>, model_bytes: &[u8]) -> Result<Self, String> {
        let name = name.into();
        log::info!("Loading ONNX model {} ({} bytes)", name, model_bytes.len());

        let session = Session::builder()
            .map_err(|e| format!("Session builder error: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Optimization error: {}", e))?
            .commit_from_memory(model_bytes)
            .map_err(|e| format!("Load from memory error: {}", e))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| "No output defined".to_string())?;

        log::info!("ONNX model loaded, reading output '{}'", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            name,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn predict_log(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let input_array = Array2::<f32>::from_shape_vec(
            (1, FEATURE_COUNT),
            features.to_f32_array().to_vec(),
        ).map_err(|e| InferenceError::Tensor(e.to_string()))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Tensor(e.to_string()))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs.get(self.output_name.as_str())
            .ok_or(InferenceError::NoOutput)?;

        let output_tensor = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let data = output_tensor.1;
        data.first()
            .map(|v| f64::from(*v))
            .ok_or(InferenceError::NoOutput)
    }

    fn format(&self) -> ModelFormat {
        ModelFormat::Onnx
    }

    fn name(&self) -> &str {
        &self.name
    }
}
