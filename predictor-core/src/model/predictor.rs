//! Predictor - feature vector in, kilowatts out
//!
//! Model output is on the log1p scale; `expm1` maps it back to kW.
//! Negative or NaN results are passed through unchanged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use super::inference::{InferenceError, Regressor};

/// Inverse of the training-time `log1p` target transform
pub fn inverse_log_transform(log_value: f64) -> f64 {
    log_value.exp_m1()
}

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Raw model output (log1p scale)
    pub log_value: f64,
    pub kilowatts: f64,
    pub inference_time_us: u64,
}

impl Prediction {
    /// e.g. `"0.000 kW"`
    pub fn display_kw(&self) -> String {
        format!("{:.3} kW", self.kilowatts)
    }
}

/// Engine Status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// Runs predictions against one injected model.
///
/// Cheap to clone; clones share the model and the latency counters.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn Regressor>,
    stats: Arc<Stats>,
}

#[derive(Default)]
struct Stats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Predictor {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self {
            model,
            stats: Arc::new(Stats::default()),
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, InferenceError> {
        let start_time = Instant::now();

        let log_value = self.model.predict_log(features)?;
        let kilowatts = inverse_log_transform(log_value);

        let inference_time_us = start_time.elapsed().as_micros() as u64;
        self.stats.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        self.stats.inference_count.fetch_add(1, Ordering::Relaxed);

        if !kilowatts.is_finite() || kilowatts < 0.0 {
            log::warn!("Implausible prediction {} kW (log value {})", kilowatts, log_value);
        }

        Ok(Prediction {
            log_value,
            kilowatts,
            inference_time_us,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.stats.latency_sum_us.load(Ordering::Relaxed);
        let count = self.stats.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.model.name().to_string(),
            inference_device: format!("{} (CPU)", self.model.format().as_str()),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("model", &self.model.name())
            .finish()
    }
}
