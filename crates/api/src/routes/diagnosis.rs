//! Diagnosis Routes

use alerting::PlantAlert;
use axum::{extract::State, Json};
use fallback::HeuristicAssessment;
use feature_engine::{compute_features, OperatingSample};
use inference_engine::{diagnose, DiagnosisResult, DiagnosisStatus};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::{ApiError, AppState};

/// Diagnosis request: the sample plus an optional threshold override
#[derive(Debug, Deserialize)]
pub struct DiagnosisRequest {
    #[serde(flatten)]
    pub sample: OperatingSample,
    pub threshold: Option<f64>,
}

/// Response for the diagnosis endpoint
#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    pub diagnosis: DiagnosisResult,
    pub alert: PlantAlert,
    /// Rule-based estimate, only when the model is unavailable
    pub heuristic: Option<HeuristicAssessment>,
    pub latency_ms: f64,
}

/// Run a diagnosis for one sample
pub async fn run_diagnosis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiagnosisRequest>,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let start = Instant::now();
    let sample = request.sample;

    let threshold = request
        .threshold
        .unwrap_or_else(|| state.predictor.threshold());
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ApiError::InvalidThreshold(threshold));
    }

    if let Some(validator) = &state.validator {
        let result = validator.validate_sample(&sample);
        if !result.valid {
            counter!("diagnosis_requests_total", "status" => "rejected").increment(1);
            return Err(ApiError::Validation(result.errors));
        }
    }

    let registry = state.registry.get();
    debug!(
        "Diagnosing sample: quality={} speed={}rpm torque={}Nm wear={}min",
        sample.product_quality.as_str(),
        sample.rotational_speed_rpm,
        sample.torque_nm,
        sample.tool_wear_min
    );
    let features = compute_features(&sample);
    let diagnosis = diagnose(&features, registry.as_deref(), threshold);
    let alert = state.alerts.evaluate(&diagnosis);

    let heuristic = match diagnosis.status {
        DiagnosisStatus::Available => None,
        DiagnosisStatus::Unavailable => Some(state.fallback.assess(&sample)),
    };

    for entry in diagnosis.errors() {
        if let Some(error) = entry.error() {
            warn!("{} not scored: {}", entry.mode, error);
        }
        counter!("mode_errors_total", "mode" => entry.mode.as_str()).increment(1);
    }

    let status = match diagnosis.status {
        DiagnosisStatus::Available => "available",
        DiagnosisStatus::Unavailable => "unavailable",
    };
    counter!("diagnosis_requests_total", "status" => status).increment(1);
    if diagnosis.aggregate_is_failing {
        counter!("plant_alarms_total").increment(1);
        info!(
            "Plant alarm: {} (max probability {:?})",
            alert.headline, diagnosis.aggregate_max_probability
        );
    }

    let elapsed = start.elapsed();
    histogram!("diagnosis_latency_seconds").record(elapsed.as_secs_f64());

    Ok(Json(DiagnosisResponse {
        diagnosis,
        alert,
        heuristic,
        latency_ms: elapsed.as_secs_f64() * 1000.0,
    }))
}
