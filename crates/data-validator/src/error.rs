//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// Errors during sample validation
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite reading
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
}
