//! Plant Diagnostics API Server
//!
//! HTTP surface for the maintenance dashboard: feature table, on-demand
//! diagnosis, health and Prometheus metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod error;
pub mod rate_limit;
mod routes;
pub mod settings;

pub use error::ApiError;
pub use routes::diagnosis::{DiagnosisRequest, DiagnosisResponse};
pub use routes::features::{FeatureCell, FeaturesResponse, ModelRow};
pub use settings::{LoggingSettings, Settings};

use alerting::AlertManager;
use data_validator::Validator;
use fallback::FallbackEngine;
use feature_engine::{FeatureEngineer, FeatureSchema};
use inference_engine::{FailureMode, FailurePredictor, SharedRegistry};

/// Application state shared across handlers
pub struct AppState {
    /// Classifier bundle, loaded once
    pub registry: SharedRegistry,
    /// Threshold-bound predictor
    pub predictor: FailurePredictor,
    /// Present when input validation is enabled
    pub validator: Option<Validator>,
    /// Heuristic shown when no model is loaded
    pub fallback: FallbackEngine,
    /// Diagnosis to alert mapping
    pub alerts: AlertManager,
    /// Prometheus handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state from settings
    pub fn new(settings: &Settings) -> Self {
        Self {
            registry: SharedRegistry::new(&settings.model.artifact_path),
            predictor: FailurePredictor::new(settings.model.threshold),
            validator: settings
                .validation
                .enabled
                .then(|| Validator::new(settings.validation.ranges.clone())),
            fallback: FallbackEngine::new(settings.fallback.clone()),
            alerts: AlertManager::new(settings.alerting.clone()),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Replace the classifier registry
    pub fn with_registry(mut self, registry: SharedRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Attach a Prometheus handle
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Feature engineer matching the loaded bundle, extended layout otherwise
    pub fn engineer(&self) -> FeatureEngineer {
        match self.registry.get() {
            Some(registry) => FeatureEngineer::new(registry.schema().clone()),
            None => FeatureEngineer::new(FeatureSchema::extended()),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
}

/// Classifier bundle status
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub available: bool,
    pub artifact_path: String,
    pub loaded_modes: Vec<FailureMode>,
    pub missing_modes: Vec<FailureMode>,
    pub columns: Vec<&'static str>,
    pub threshold: f64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, rate_limit: &rate_limit::RateLimitConfig) -> Router {
    let mut diagnosis: Router<Arc<AppState>> =
        Router::new().route("/api/v1/diagnosis", post(routes::diagnosis::run_diagnosis));

    if rate_limit.enabled {
        match rate_limit::create_governor_config(rate_limit) {
            Some(config) => diagnosis = diagnosis.layer(GovernorLayer { config }),
            None => warn!("Rate limiting disabled: invalid quota {:?}", rate_limit),
        }
    }

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/features", post(routes::features::feature_table))
        .route("/metrics", get(metrics_handler))
        .merge(diagnosis)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let registry = state.registry.get();
    let loaded_modes = registry.as_ref().map(|r| r.modes()).unwrap_or_default();
    let missing_modes = FailureMode::ALL
        .into_iter()
        .filter(|m| !loaded_modes.contains(m))
        .collect();

    let response = HealthResponse {
        status: if registry.is_some() { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            available: registry.is_some(),
            artifact_path: state.registry.path().display().to_string(),
            columns: state.engineer().schema().names(),
            loaded_modes,
            missing_modes,
            threshold: state.predictor.threshold(),
        },
    };

    Json(response)
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    let result = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics exporter unavailable: {}", e);
            None
        }
    }
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let mut state = AppState::new(&settings);
    if let Some(handle) = install_metrics() {
        state = state.with_metrics(handle);
    }

    match state.registry.get() {
        Some(registry) => info!(
            "Model bundle ready: {} classifier(s), {} columns",
            registry.len(),
            registry.schema().len()
        ),
        None => warn!(
            "No model bundle at {}; diagnoses will report the model as unavailable",
            settings.model.artifact_path
        ),
    }

    let app = create_router(Arc::new(state), &settings.rate_limit);

    info!("Starting API server on {}", settings.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
