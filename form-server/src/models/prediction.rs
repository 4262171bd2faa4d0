//! Prediction form model
//!
//! The ranges below are the input bounds shown on the form; they must stay
//! in sync with `predictor_core::FEATURE_SPECS` (checked in tests).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use validator::Validate;

use predictor_core::features::layout::field_spec;
use predictor_core::{FeatureVector, FieldKind, Prediction, FEATURE_COUNT, FEATURE_SPECS};

/// Raw form / JSON input. Integers are `i64` so out-of-range values reach
/// validation instead of failing to parse.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionForm {
    #[validate(range(min = 0.0, max = 2.0))]
    pub global_reactive_power: f64,

    #[validate(range(min = 200.0, max = 260.0))]
    pub voltage: f64,

    #[validate(range(min = 0.0, max = 60.0))]
    pub global_intensity: f64,

    #[validate(range(min = 0.0, max = 50.0))]
    pub sub_metering_1: f64,

    #[validate(range(min = 0.0, max = 50.0))]
    pub sub_metering_2: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub sub_metering_3: f64,

    #[validate(range(min = 0, max = 23))]
    pub hour: i64,

    #[validate(range(min = 1, max = 31))]
    pub day: i64,

    #[validate(range(min = 1, max = 12))]
    pub month: i64,

    #[validate(range(min = 0, max = 6))]
    pub dayofweek: i64,

    #[validate(range(min = 0, max = 1))]
    pub is_weekend: i64,
}

/// Field name → message, ordered by name
pub type FieldErrors = BTreeMap<String, String>;

impl PredictionForm {
    /// Parse submitted text fields one by one.
    ///
    /// On failure the returned form keeps every field that did parse and
    /// falls back to the default for the rest, so the page can be re-rendered.
    pub fn from_raw(raw: &HashMap<String, String>) -> Result<Self, (Self, FieldErrors)> {
        let mut values = FeatureVector::default().to_array();
        let mut errors = FieldErrors::new();

        for (value, spec) in values.iter_mut().zip(FEATURE_SPECS.iter()) {
            let text = raw.get(spec.name).map(|s| s.trim()).unwrap_or("");
            if text.is_empty() {
                errors.insert(spec.name.to_string(), format!("{} is required", spec.label));
                continue;
            }

            let parsed = match spec.kind {
                FieldKind::Float => text.parse::<f64>().ok(),
                FieldKind::Integer => text.parse::<i64>().ok().map(|v| v as f64),
            };
            match parsed {
                Some(parsed) => *value = parsed,
                None => {
                    let expected = match spec.kind {
                        FieldKind::Float => "a number",
                        FieldKind::Integer => "a whole number",
                    };
                    errors.insert(spec.name.to_string(), format!("{} must be {}", spec.label, expected));
                }
            }
        }

        let form = Self::from_values(values);
        if errors.is_empty() {
            Ok(form)
        } else {
            Err((form, errors))
        }
    }

    fn from_values(v: [f64; FEATURE_COUNT]) -> Self {
        Self {
            global_reactive_power: v[0],
            voltage: v[1],
            global_intensity: v[2],
            sub_metering_1: v[3],
            sub_metering_2: v[4],
            sub_metering_3: v[5],
            hour: v[6] as i64,
            day: v[7] as i64,
            month: v[8] as i64,
            dayofweek: v[9] as i64,
            is_weekend: v[10] as i64,
        }
    }

    /// Validate bounds, then narrow into the model's feature vector
    pub fn into_features(self) -> Result<FeatureVector, FieldErrors> {
        if let Err(errors) = self.validate() {
            let messages = errors
                .field_errors()
                .into_iter()
                .map(|(field, _)| {
                    let field = field.to_string();
                    let message = bounds_message(&field);
                    (field, message)
                })
                .collect();
            return Err(messages);
        }

        let features = FeatureVector {
            global_reactive_power: self.global_reactive_power,
            voltage: self.voltage,
            global_intensity: self.global_intensity,
            sub_metering_1: self.sub_metering_1,
            sub_metering_2: self.sub_metering_2,
            sub_metering_3: self.sub_metering_3,
            hour: self.hour as u8,
            day: self.day as u8,
            month: self.month as u8,
            dayofweek: self.dayofweek as u8,
            is_weekend: self.is_weekend as u8,
        };

        // Range rules compare with < and >, which NaN slips past
        let rejected = features.out_of_bounds();
        if !rejected.is_empty() {
            return Err(rejected
                .into_iter()
                .map(|field| (field.to_string(), bounds_message(field)))
                .collect());
        }

        Ok(features)
    }
}

impl From<&FeatureVector> for PredictionForm {
    fn from(v: &FeatureVector) -> Self {
        Self {
            global_reactive_power: v.global_reactive_power,
            voltage: v.voltage,
            global_intensity: v.global_intensity,
            sub_metering_1: v.sub_metering_1,
            sub_metering_2: v.sub_metering_2,
            sub_metering_3: v.sub_metering_3,
            hour: i64::from(v.hour),
            day: i64::from(v.day),
            month: i64::from(v.month),
            dayofweek: i64::from(v.dayofweek),
            is_weekend: i64::from(v.is_weekend),
        }
    }
}

fn bounds_message(field: &str) -> String {
    match field_spec(field) {
        Some(spec) => format!(
            "{} must be between {} and {}",
            spec.label,
            spec.format_value(spec.min),
            spec.format_value(spec.max)
        ),
        None => format!("{} is out of range", field),
    }
}

/// JSON prediction response
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub inputs: FeatureVector,
    pub log_value: f64,
    pub kilowatts: f64,
    pub display: String,
    pub inference_time_us: u64,
}

impl PredictionResponse {
    pub fn new(inputs: FeatureVector, prediction: Prediction) -> Self {
        Self {
            inputs,
            log_value: prediction.log_value,
            kilowatts: prediction.kilowatts,
            display: prediction.display_kw(),
            inference_time_us: prediction.inference_time_us,
        }
    }
}
