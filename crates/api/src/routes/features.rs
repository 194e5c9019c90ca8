//! Feature Table Routes

use axum::{extract::State, Json};
use feature_engine::{compute_features, OperatingSample};
use serde::Serialize;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// One row of the displayed feature table
#[derive(Debug, Serialize)]
pub struct FeatureCell {
    pub column: &'static str,
    pub value: f64,
}

/// Values exactly as fed to the classifiers
#[derive(Debug, Serialize)]
pub struct ModelRow {
    pub columns: Vec<&'static str>,
    pub values: Vec<f64>,
}

/// Response for the features endpoint
#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub sample: OperatingSample,
    pub table: Vec<FeatureCell>,
    pub model_row: ModelRow,
}

/// Compute the feature table for a sample
pub async fn feature_table(
    State(state): State<Arc<AppState>>,
    Json(sample): Json<OperatingSample>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    if let Some(validator) = &state.validator {
        let result = validator.validate_sample(&sample);
        if !result.valid {
            return Err(ApiError::Validation(result.errors));
        }
    }

    let table = compute_features(&sample)
        .table()
        .into_iter()
        .map(|(column, value)| FeatureCell { column, value })
        .collect();

    let row = state.engineer().compute(&sample);

    Ok(Json(FeaturesResponse {
        sample,
        table,
        model_row: ModelRow {
            columns: row.schema().names(),
            values: row.values().to_vec(),
        },
    }))
}
