//! Configuration module

use std::env;
use std::path::PathBuf;

use predictor_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model artifact path
    pub model_path: PathBuf,

    /// Listen address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: PathBuf::from(constants::get_model_path()),

            host: constants::get_host(),

            port: constants::get_port(),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
