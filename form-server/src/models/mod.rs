//! Request/response models

pub mod prediction;

pub use prediction::{FieldErrors, PredictionForm, PredictionResponse};
