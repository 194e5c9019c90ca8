//! Data Validation
//!
//! Defensive range checking for operating samples. The input surface is
//! expected to enforce these bounds already; this crate catches callers that
//! do not.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Validator, ValidationConfig, ValidationResult};
