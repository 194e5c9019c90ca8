//! Feature Engineering Engine
//!
//! Turns a raw operating sample (temperatures, speed, torque, tool wear and
//! product quality) into the fixed-order feature rows consumed by the
//! failure-mode classifiers.

mod features;
mod sample;
mod schema;

pub use features::{
    compute_features, FeatureEngineer, FeatureRow, FeatureVector, RPM_TO_RAD_PER_SEC,
};
pub use sample::{OperatingSample, ProductQuality};
pub use schema::{FeatureColumn, FeatureLayout, FeatureSchema, SchemaError};
