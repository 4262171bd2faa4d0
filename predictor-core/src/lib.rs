//! Energy Consumption Predictor - Core
//!
//! Household metering readings + calendar features in, predicted
//! consumption in kW out.
//!
//! ```text
//! FeatureVector ──to_array()──▶ Regressor::predict_log ──expm1──▶ Prediction (kW)
//!                                   ▲
//!                     load_model(path) at startup
//! ```

pub mod constants;
pub mod features;
pub mod model;

pub use features::{FeatureVector, FieldKind, FieldSpec, LayoutInfo, FEATURE_COUNT, FEATURE_SPECS};
pub use model::{
    load_model, ArtifactLoadError, InferenceError, LoadedModel, ModelMetadata, Prediction,
    Predictor, Regressor,
};
