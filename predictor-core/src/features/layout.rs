//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the model was trained on.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Artifacts can declare the names they were trained with; the loader
//! compares them against this layout through [`layout_hash`].

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order the model expects them
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Electrical (0-2) ===
    "global_reactive_power", // 0: kW
    "voltage",               // 1: V
    "global_intensity",      // 2: A

    // === Sub metering (3-5) ===
    "sub_metering_1",        // 3: Wh, kitchen
    "sub_metering_2",        // 4: Wh, laundry
    "sub_metering_3",        // 5: Wh, heating / AC

    // === Calendar (6-10) ===
    "hour",                  // 6: 0-23
    "day",                   // 7: 1-31
    "month",                 // 8: 1-12
    "dayofweek",             // 9: 0 = Mon, 6 = Sun
    "is_weekend",            // 10: 0 or 1
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 11;

// ============================================================================
// FIELD SPECS (input bounds for the form layer)
// ============================================================================

/// Numeric kind of a feature as collected from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Float,
    Integer,
}

/// Input metadata for one feature.
///
/// Bounds are enforced by whoever collects the input, never by the predictor.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Input label
    pub label: &'static str,
    /// Label in the input summary table
    pub summary_label: &'static str,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl FieldSpec {
    const fn float(
        name: &'static str,
        label: &'static str,
        summary_label: &'static str,
        (min, max): (f64, f64),
        default: f64,
    ) -> Self {
        Self { name, label, summary_label, kind: FieldKind::Float, min, max, step: 0.001, default }
    }

    const fn integer(
        name: &'static str,
        label: &'static str,
        summary_label: &'static str,
        (min, max): (f64, f64),
        default: f64,
    ) -> Self {
        Self { name, label, summary_label, kind: FieldKind::Integer, min, max, step: 1.0, default }
    }

    /// Whether `value` lies inside the inclusive UI bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Format a value the way the input summary shows it
    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            FieldKind::Float => format!("{:.3}", value),
            FieldKind::Integer => format!("{}", value as i64),
        }
    }
}

/// Field specs, index-aligned with FEATURE_LAYOUT
pub static FEATURE_SPECS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec::float("global_reactive_power", "Global Reactive Power (kW)", "Global Reactive Power (kW)", (0.0, 2.0), 0.44),
    FieldSpec::float("voltage", "Voltage (V)", "Voltage (V)", (200.0, 260.0), 240.0),
    FieldSpec::float("global_intensity", "Global Intensity (A)", "Global Intensity (A)", (0.0, 60.0), 10.0),
    FieldSpec::float("sub_metering_1", "Sub Metering 1 – Kitchen (Wh)", "Sub Metering 1 (Wh)", (0.0, 50.0), 1.0),
    FieldSpec::float("sub_metering_2", "Sub Metering 2 – Laundry (Wh)", "Sub Metering 2 (Wh)", (0.0, 50.0), 1.0),
    FieldSpec::float("sub_metering_3", "Sub Metering 3 – Heating / AC (Wh)", "Sub Metering 3 (Wh)", (0.0, 100.0), 10.0),
    FieldSpec::integer("hour", "Hour of Day", "Hour", (0.0, 23.0), 12.0),
    FieldSpec::integer("day", "Day of Month", "Day", (1.0, 31.0), 15.0),
    FieldSpec::integer("month", "Month", "Month", (1.0, 12.0), 6.0),
    FieldSpec::integer("dayofweek", "Day of Week (0 = Mon, 6 = Sun)", "Day of Week", (0.0, 6.0), 2.0),
    FieldSpec::integer("is_weekend", "Is Weekend?", "Is Weekend", (0.0, 1.0), 0.0),
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version + names, in order
fn hash_names<'a>(version: u8, names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Compute CRC32 hash of the compiled feature layout
pub fn compute_layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

/// Get layout hash
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

/// Hash of an arbitrary name list under the current version.
///
/// Used for layouts declared by model artifacts.
pub fn declared_layout_hash<S: AsRef<str>>(names: &[S]) -> u32 {
    hash_names(FEATURE_VERSION, names.iter().map(|n| n.as_ref()))
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub features: Vec<FieldSpec>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            features: FEATURE_SPECS.to_vec(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a declared feature layout doesn't match the compiled one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Validate a list of feature names declared by an artifact
pub fn validate_declared_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    validate_layout(FEATURE_VERSION, declared_layout_hash(names))
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get field spec by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    feature_index(name).map(|i| &FEATURE_SPECS[i])
}

// ============================================================================
// TESTS
// ============================================================================
