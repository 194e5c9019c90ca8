//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::OperatingSample;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Air temperature valid range (K)
    pub air_temp_range: (f64, f64),
    /// Process temperature valid range (K)
    pub process_temp_range: (f64, f64),
    /// Rotational speed valid range (rpm)
    pub rpm_range: (f64, f64),
    /// Torque valid range (Nm)
    pub torque_range: (f64, f64),
    /// Tool wear valid range (min)
    pub tool_wear_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            air_temp_range: (295.0, 305.0),
            process_temp_range: (305.0, 315.0),
            rpm_range: (1100.0, 2900.0),
            torque_range: (3.0, 80.0),
            tool_wear_range: (0.0, 250.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Validator for operating samples
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every reading of a sample, collecting all failures
    pub fn validate_sample(&self, sample: &OperatingSample) -> ValidationResult {
        let checks = [
            ("air_temp_k", sample.air_temp_k, self.config.air_temp_range),
            ("process_temp_k", sample.process_temp_k, self.config.process_temp_range),
            (
                "rotational_speed_rpm",
                f64::from(sample.rotational_speed_rpm),
                self.config.rpm_range,
            ),
            ("torque_nm", sample.torque_nm, self.config.torque_range),
            (
                "tool_wear_min",
                f64::from(sample.tool_wear_min),
                self.config.tool_wear_range,
            ),
        ];

        let errors: Vec<ValidationError> = checks
            .iter()
            .filter_map(|(field, value, range)| self.validate_range(*field, *value, *range).err())
            .collect();

        if errors.is_empty() {
            ValidationResult::valid(checks.len())
        } else {
            debug!("Sample rejected with {} error(s)", errors.len());
            ValidationResult::invalid(errors, checks.len())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_sample_is_valid() {
        let result = Validator::default().validate_sample(&OperatingSample::default());
        assert!(result.valid);
        assert_eq!(result.fields_checked, 5);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let validator = Validator::default();
        let sample = OperatingSample {
            air_temp_k: 295.0,
            process_temp_k: 315.0,
            rotational_speed_rpm: 2900,
            torque_nm: 3.0,
            tool_wear_min: 250,
            ..Default::default()
        };
        assert!(validator.validate_sample(&sample).valid);
    }

    #[test]
    fn test_collects_every_failure() {
        let sample = OperatingSample {
            torque_nm: -4.0,
            tool_wear_min: 300,
            ..Default::default()
        };
        let result = Validator::default().validate_sample(&sample);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0],
            ValidationError::OutOfRange {
                field: "torque_nm",
                value: -4.0,
                min: 3.0,
                max: 80.0,
            }
        );
    }

    #[test]
    fn test_nan_is_rejected() {
        let sample = OperatingSample {
            air_temp_k: f64::NAN,
            ..Default::default()
        };
        let result = Validator::default().validate_sample(&sample);
        assert_eq!(
            result.errors,
            vec![ValidationError::NonFinite { field: "air_temp_k" }]
        );
    }

    proptest! {
        #[test]
        fn prop_rpm_outside_slider_rejected(rpm in 2901u32..100_000) {
            let sample = OperatingSample { rotational_speed_rpm: rpm, ..Default::default() };
            prop_assert!(!Validator::default().validate_sample(&sample).valid);
        }
    }
}
