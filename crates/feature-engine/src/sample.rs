//! Operating Sample

use serde::{Deserialize, Serialize};

/// Product quality variant of the part being machined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductQuality {
    #[default]
    #[serde(alias = "L")]
    Low,
    #[serde(alias = "M")]
    Medium,
    #[serde(alias = "H")]
    High,
}

impl ProductQuality {
    /// Label encoding used when the classifiers were trained.
    ///
    /// `High` maps to 3, not 2. This matches the training-time encoding and
    /// must not be renumbered.
    pub fn encoded(&self) -> f64 {
        match self {
            ProductQuality::Low => 0.0,
            ProductQuality::Medium => 1.0,
            ProductQuality::High => 3.0,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductQuality::Low => "low",
            ProductQuality::Medium => "medium",
            ProductQuality::High => "high",
        }
    }
}

/// Raw machine readings captured for one interaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingSample {
    /// Air temperature (K)
    pub air_temp_k: f64,
    /// Process temperature (K)
    pub process_temp_k: f64,
    /// Spindle speed (rpm)
    pub rotational_speed_rpm: u32,
    /// Torque (Nm)
    pub torque_nm: f64,
    /// Accumulated tool wear (minutes)
    pub tool_wear_min: u32,
    /// Product quality variant
    #[serde(default)]
    pub product_quality: ProductQuality,
}

impl Default for OperatingSample {
    fn default() -> Self {
        Self {
            air_temp_k: 300.0,
            process_temp_k: 310.0,
            rotational_speed_rpm: 1500,
            torque_nm: 40.0,
            tool_wear_min: 0,
            product_quality: ProductQuality::Low,
        }
    }
}
