//! Central Configuration Constants
//!
//! Single source of truth for defaults. The server reads these through the
//! env helpers below.

/// Default model artifact, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "best_energy_model.onnx";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8501;

/// Default listen address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Energy Consumption Prediction";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get listen port from environment or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get listen host from environment or use default
pub fn get_host() -> String {
    std::env::var("HOST")
        .unwrap_or_else(|_| DEFAULT_HOST.to_string())
}
