//! Features Module - Feature schema and input vector
//!
//! `layout` owns the training-time order, `vector` packs user input into it.

pub mod layout;
pub mod vector;


// Re-export common types
pub use layout::{
    FieldKind, FieldSpec, LayoutInfo, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_SPECS, FEATURE_VERSION,
};
pub use vector::FeatureVector;
