//! Energy Consumption Prediction - Form Server
//!
//! Serves the single-page prediction form and a small JSON API over one
//! model loaded at startup.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    FORM SERVER                       │
//! ├──────────────────────────────────────────────────────┤
//! │  GET  /              form (defaults)                 │
//! │  POST /predict       form submit → summary + kW      │
//! │  POST /api/v1/predict  JSON → JSON                   │
//! │          │                                           │
//! │          ▼                                           │
//! │   Predictor ── Arc<dyn Regressor> (loaded once)      │
//! └──────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use predictor_core::{load_model, ModelMetadata, Predictor};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config);

    tracing::info!("{} v{} starting...", predictor_core::constants::APP_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.environment);

    // Fatal: no predictions without a model
    let loaded = match load_model(&config.model_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!(
                "❌ '{}' not found or unusable. Place the model artifact at that path or set MODEL_PATH.\n   {}",
                config.model_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let state = AppState {
        predictor: Predictor::new(loaded.regressor),
        metadata: Arc::new(loaded.metadata),
        templates: Arc::new(views::create_templates().context("Failed to compile templates")?),
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let default_filter = if config.is_production() {
        "form_server=info,predictor_core=info,tower_http=info"
    } else {
        "form_server=debug,predictor_core=info,tower_http=debug"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub metadata: Arc<ModelMetadata>,
    pub templates: Arc<tera::Tera>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Page
    let form_routes = Router::new()
        .route("/", get(handlers::form::index))
        .route("/predict", post(handlers::form::submit));

    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict", post(handlers::api::predict))
        .route("/api/v1/schema", get(handlers::api::schema))
        .route("/api/v1/model", get(handlers::api::model))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );

    Router::new()
        .merge(form_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use predictor_core::model::ModelFormat;
    use predictor_core::{FeatureVector, InferenceError, Regressor};

    fn test_state(log_value: f64) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constant.json");
        let artifact = serde_json::json!({
            "intercept": log_value,
            "coefficients": vec![0.0; predictor_core::FEATURE_COUNT],
        });
        std::fs::write(&path, artifact.to_string()).unwrap();
        let loaded = load_model(&path).unwrap();

        AppState {
            predictor: Predictor::new(loaded.regressor),
            metadata: Arc::new(loaded.metadata),
            templates: Arc::new(views::create_templates().unwrap()),
        }
    }

    fn default_form_body() -> &'static str {
        "global_reactive_power=0.440&voltage=240.000&global_intensity=10.000\
         &sub_metering_1=1.000&sub_metering_2=1.000&sub_metering_3=10.000\
         &hour=12&day=15&month=6&dayofweek=2&is_weekend=0"
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let app = create_router(test_state(0.0));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Input Parameters"));
        assert!(html.contains(r#"name="sub_metering_3""#));
    }

    #[tokio::test]
    async fn test_submit_zero_log_value_renders_zero_kw() {
        let app = create_router(test_state(0.0));

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(default_form_body()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<td>Global Reactive Power (kW)</td><td>0.440</td>"));
        assert!(html.contains("<td>Voltage (V)</td><td>240.000</td>"));
        assert!(html.contains("<td>Hour</td><td>12</td>"));
        assert!(html.contains("Predicted Energy Consumption: <strong>0.000 kW</strong>"));
    }

    #[tokio::test]
    async fn test_submit_out_of_bounds_rerenders_form() {
        let app = create_router(test_state(0.0));
        let body = default_form_body().replace("voltage=240.000", "voltage=300");

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("Voltage (V) must be between 200.000 and 260.000"));
        assert!(!html.contains("Predicted Energy Consumption:"));
    }

    #[tokio::test]
    async fn test_api_predict() {
        let app = create_router(test_state(1.0));
        let body = serde_json::json!({
            "global_reactive_power": 0.44,
            "voltage": 240.0,
            "global_intensity": 10.0,
            "sub_metering_1": 1.0,
            "sub_metering_2": 1.0,
            "sub_metering_3": 10.0,
            "hour": 12,
            "day": 15,
            "month": 6,
            "dayofweek": 2,
            "is_weekend": 0
        });

        let response = app
            .oneshot(
                Request::post("/api/v1/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["log_value"], 1.0);
        assert!((json["kilowatts"].as_f64().unwrap() - 1.0_f64.exp_m1()).abs() < 1e-12);
        assert_eq!(json["display"], "1.718 kW");
        assert_eq!(json["inputs"]["month"], 6);
    }

    #[tokio::test]
    async fn test_api_predict_rejects_out_of_bounds() {
        let app = create_router(test_state(0.0));
        let body = serde_json::json!({
            "global_reactive_power": 0.44,
            "voltage": 240.0,
            "global_intensity": 10.0,
            "sub_metering_1": 1.0,
            "sub_metering_2": 1.0,
            "sub_metering_3": 10.0,
            "hour": 30,
            "day": 15,
            "month": 6,
            "dayofweek": 2,
            "is_weekend": 0
        });

        let response = app
            .oneshot(
                Request::post("/api/v1/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], "Hour of Day must be between 0 and 23");
    }

    #[tokio::test]
    async fn test_schema_and_model_endpoints() {
        let state = test_state(0.0);
        state.predictor.predict(&predictor_core::FeatureVector::default()).unwrap();
        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let schema: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(schema["feature_count"], 11);
        assert_eq!(schema["features"][1]["name"], "voltage");

        let response = app
            .oneshot(Request::get("/api/v1/model").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let model: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(model["metadata"]["format"], "linear");
        assert_eq!(model["engine"]["inference_count"], 1);
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state(0.0);
        state.predictor.predict(&FeatureVector::default()).unwrap();
        let app = create_router(state.clone());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model"]["format"], "linear");
        assert_eq!(json["model"]["sha256"].as_str().unwrap().len(), 12);
        assert!(state.metadata.sha256.starts_with(json["model"]["sha256"].as_str().unwrap()));
        assert!(json["model"]["loaded_at"].is_string());
        assert_eq!(json["model"]["inference_count"], 1);
    }

    #[tokio::test]
    async fn test_submit_nan_rerenders_form() {
        let app = create_router(test_state(0.0));
        let body = default_form_body().replace("voltage=240.000", "voltage=NaN");

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("Voltage (V) must be between 200.000 and 260.000"));
        assert!(!html.contains("Predicted Energy Consumption:"));
    }

    #[tokio::test]
    async fn test_submit_malformed_fields_rerenders_form() {
        let app = create_router(test_state(0.0));
        let body = default_form_body()
            .replace("voltage=240.000", "voltage=")
            .replace("hour=12", "hour=abc");

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(response).await;
        assert!(html.contains("Input Parameters"));
        assert!(html.contains("Voltage (V) is required"));
        assert!(html.contains("Hour of Day must be a whole number"));
        assert!(!html.contains("Predicted Energy Consumption:"));
    }

    struct FailingRegressor;

    impl Regressor for FailingRegressor {
        fn predict_log(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
            Err(InferenceError::Runtime("session poisoned".to_string()))
        }

        fn format(&self) -> ModelFormat {
            ModelFormat::Onnx
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn failing_state() -> AppState {
        AppState {
            predictor: Predictor::new(Arc::new(FailingRegressor)),
            ..test_state(0.0)
        }
    }

    #[tokio::test]
    async fn test_inference_failure_returns_500() {
        let app = create_router(failing_state());
        let body = serde_json::to_string(&FeatureVector::default()).unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/v1/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"], "Prediction failed: Inference failed: session poisoned");
        assert_eq!(json["status"], 500);

        let response = app
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(default_form_body()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
