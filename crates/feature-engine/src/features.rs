//! Feature Vector Assembly

use crate::sample::OperatingSample;
use crate::schema::{FeatureColumn, FeatureSchema};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Converts rpm to angular velocity in rad/s (2π/60)
pub const RPM_TO_RAD_PER_SEC: f64 = 2.0 * std::f64::consts::PI / 60.0;

/// Canonical nine-column feature record for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub air_temp_k: f64,
    pub process_temp_k: f64,
    pub rotational_speed_rpm: f64,
    pub torque_nm: f64,
    pub tool_wear_min: f64,
    /// Encoded product quality (0, 1 or 3)
    pub type_encoded: f64,
    /// Process minus air temperature (K), not clamped
    pub temp_delta: f64,
    /// Mechanical power (W)
    pub power_w: f64,
    /// Tool wear × torque interaction term
    pub wear_torque_product: f64,
}

impl FeatureVector {
    /// Value of a single column
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::AirTemperature => self.air_temp_k,
            FeatureColumn::ProcessTemperature => self.process_temp_k,
            FeatureColumn::RotationalSpeed => self.rotational_speed_rpm,
            FeatureColumn::Torque => self.torque_nm,
            FeatureColumn::ToolWear => self.tool_wear_min,
            FeatureColumn::ProductType => self.type_encoded,
            FeatureColumn::TempDelta => self.temp_delta,
            FeatureColumn::Power => self.power_w,
            FeatureColumn::WearTorque => self.wear_torque_product,
        }
    }

    /// Select the columns of `schema`, in schema order
    pub fn project(&self, schema: &FeatureSchema) -> FeatureRow {
        FeatureRow {
            values: schema.columns().iter().map(|c| self.value(*c)).collect(),
            schema: schema.clone(),
        }
    }

    /// All nine columns as `(name, value)` pairs for display
    pub fn table(&self) -> Vec<(&'static str, f64)> {
        FeatureColumn::ALL
            .iter()
            .map(|c| (c.as_str(), self.value(*c)))
            .collect()
    }
}

/// Compute the canonical feature vector.
///
/// Pure and deterministic. Out-of-range readings are not corrected; they flow
/// through the formulas unchanged.
pub fn compute_features(sample: &OperatingSample) -> FeatureVector {
    let rpm = f64::from(sample.rotational_speed_rpm);
    let tool_wear = f64::from(sample.tool_wear_min);

    FeatureVector {
        air_temp_k: sample.air_temp_k,
        process_temp_k: sample.process_temp_k,
        rotational_speed_rpm: rpm,
        torque_nm: sample.torque_nm,
        tool_wear_min: tool_wear,
        type_encoded: sample.product_quality.encoded(),
        temp_delta: sample.process_temp_k - sample.air_temp_k,
        power_w: sample.torque_nm * rpm * RPM_TO_RAD_PER_SEC,
        wear_torque_product: tool_wear * sample.torque_nm,
    }
}

/// Feature values laid out in a specific schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Feature engineer bound to a configured column layout
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    schema: FeatureSchema,
}

impl FeatureEngineer {
    /// Create an engineer producing rows in `schema` order
    pub fn new(schema: FeatureSchema) -> Self {
        debug!("Feature layout: {:?}", schema.names());
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Compute the row fed to the classifiers
    pub fn compute(&self, sample: &OperatingSample) -> FeatureRow {
        compute_features(sample).project(&self.schema)
    }
}
