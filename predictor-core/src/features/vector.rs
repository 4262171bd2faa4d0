//! Feature Vector - Core data structure for model input
//!
//! Named fields in schema order. The only way to get raw values out is
//! [`FeatureVector::to_array`], which packs them in [`FEATURE_LAYOUT`] order,
//! so callers can never hand the model a misordered vector.

use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_SPECS, FEATURE_VERSION, layout_hash};

/// One household reading plus its calendar features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// kW
    pub global_reactive_power: f64,
    /// V
    pub voltage: f64,
    /// A
    pub global_intensity: f64,
    /// Wh, kitchen
    pub sub_metering_1: f64,
    /// Wh, laundry
    pub sub_metering_2: f64,
    /// Wh, heating / AC
    pub sub_metering_3: f64,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    /// 0 = Monday, 6 = Sunday
    pub dayofweek: u8,
    /// 0 or 1
    pub is_weekend: u8,
}

impl Default for FeatureVector {
    /// The form's initial values
    fn default() -> Self {
        Self {
            global_reactive_power: 0.440,
            voltage: 240.000,
            global_intensity: 10.000,
            sub_metering_1: 1.000,
            sub_metering_2: 1.000,
            sub_metering_3: 10.000,
            hour: 12,
            day: 15,
            month: 6,
            dayofweek: 2,
            is_weekend: 0,
        }
    }
}

impl FeatureVector {
    /// Pack values in schema order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.global_reactive_power,
            self.voltage,
            self.global_intensity,
            self.sub_metering_1,
            self.sub_metering_2,
            self.sub_metering_3,
            f64::from(self.hour),
            f64::from(self.day),
            f64::from(self.month),
            f64::from(self.dayofweek),
            f64::from(self.is_weekend),
        ]
    }

    /// Pack values in schema order as f32 (ONNX tensors)
    pub fn to_f32_array(&self) -> [f32; FEATURE_COUNT] {
        self.to_array().map(|v| v as f32)
    }

    /// Names of fields whose value falls outside the UI bounds
    pub fn out_of_bounds(&self) -> Vec<&'static str> {
        self.to_array()
            .iter()
            .zip(FEATURE_SPECS.iter())
            .filter(|(value, spec)| !spec.contains(**value))
            .map(|(_, spec)| spec.name)
            .collect()
    }

    /// (label, formatted value) rows for the input summary table
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        self.to_array()
            .iter()
            .zip(FEATURE_SPECS.iter())
            .map(|(value, spec)| (spec.summary_label, spec.format_value(*value)))
            .collect()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        let values = self.to_array();
        serde_json::json!({
            "feature_version": FEATURE_VERSION,
            "layout_hash": layout_hash(),
            "named_values": FEATURE_LAYOUT.iter()
                .zip(values.iter())
                .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
                .collect::<serde_json::Map<String, serde_json::Value>>(),
        })
    }
}
