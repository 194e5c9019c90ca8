//! Failure Inference Engine
//!
//! Loads the per-failure-mode binary classifiers from a model bundle and
//! reduces their positive-class probabilities into a plant diagnosis.

mod classifier;
mod manifest;
mod mode;
mod onnx;
mod predictor;
mod registry;

pub use classifier::{
    Classifier, ConstantClassifier, ForestClassifier, LogisticClassifier, TreeNode,
};
pub use manifest::{ClassifierSpec, ModelBundle};
pub use mode::FailureMode;
pub use onnx::OnnxClassifier;
pub use predictor::{
    diagnose, diagnose_row, DiagnosisResult, DiagnosisStatus, FailurePredictor, ModeDiagnosis,
    ModeError, ModeOutcome, DEFAULT_THRESHOLD,
};
pub use registry::{ClassifierRegistry, SharedRegistry};

use thiserror::Error;

/// Errors while loading or invoking classifiers
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model artifact not found or unreadable at {path}: {reason}")]
    ArtifactMissing { path: String, reason: String },
    #[error("Model artifact is invalid: {0}")]
    ArtifactInvalid(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}
