//! Model Module - loader, regressors and predictor
//!
//! `loader` turns an artifact path into a `Regressor`; `predictor` wraps it
//! with the inverse target transform.

pub mod inference;
pub mod linear;
pub mod loader;
pub mod predictor;


// Re-export common types
pub use inference::{InferenceError, ModelFormat, OnnxRegressor, Regressor};
pub use linear::{LinearArtifact, LinearRegressor};
pub use loader::{load_model, ArtifactLoadError, LoadedModel, ModelMetadata};
pub use predictor::{inverse_log_transform, EngineStatus, Prediction, Predictor};
