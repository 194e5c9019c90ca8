//! Failure Predictor
//!
//! Runs every failure-mode classifier against one sample's features and
//! reduces the positive-class probabilities into a plant-level diagnosis.
//! Failures are isolated per mode; nothing here returns an error or panics.

use crate::classifier::Classifier;
use crate::mode::FailureMode;
use crate::registry::ClassifierRegistry;
use feature_engine::{FeatureRow, FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

/// Default decision threshold on the positive-class probability
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Why a single failure mode could not be scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ModeError {
    #[error("model not found")]
    ModeNotFound,
    #[error("classifier invocation failed: {0}")]
    ClassifierInvocation(String),
    #[error("feature contract mismatch: expected {expected:?}, got {actual:?}")]
    FeatureContractMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Outcome for one failure mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModeOutcome {
    Scored { probability: f64, is_failing: bool },
    Failed { error: ModeError },
}

/// Diagnosis entry for one failure mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeDiagnosis {
    pub mode: FailureMode,
    #[serde(flatten)]
    pub outcome: ModeOutcome,
}

impl ModeDiagnosis {
    /// Positive-class probability, if scored
    pub fn probability(&self) -> Option<f64> {
        match self.outcome {
            ModeOutcome::Scored { probability, .. } => Some(probability),
            ModeOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failing(&self) -> bool {
        matches!(self.outcome, ModeOutcome::Scored { is_failing: true, .. })
    }

    pub fn error(&self) -> Option<&ModeError> {
        match &self.outcome {
            ModeOutcome::Failed { error } => Some(error),
            ModeOutcome::Scored { .. } => None,
        }
    }
}

/// Whether classifiers were available at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    Available,
    /// No model bundle loaded
    Unavailable,
}

/// Result of one diagnosis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub status: DiagnosisStatus,
    pub threshold: f64,
    /// One entry per failure mode in evaluation order, empty when unavailable
    pub modes: Vec<ModeDiagnosis>,
    /// True when any mode is above the threshold
    pub aggregate_is_failing: bool,
    /// Highest scored probability, `None` when nothing was scored
    pub aggregate_max_probability: Option<f64>,
    /// First mode above the threshold in evaluation order
    pub primary_cause: Option<FailureMode>,
}

impl DiagnosisResult {
    /// Result for a missing model bundle
    pub fn unavailable(threshold: f64) -> Self {
        Self {
            status: DiagnosisStatus::Unavailable,
            threshold,
            modes: Vec::new(),
            aggregate_is_failing: false,
            aggregate_max_probability: None,
            primary_cause: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == DiagnosisStatus::Available
    }

    /// Entry for a given mode
    pub fn mode(&self, mode: FailureMode) -> Option<&ModeDiagnosis> {
        self.modes.iter().find(|d| d.mode == mode)
    }

    /// Entries that could not be scored
    pub fn errors(&self) -> impl Iterator<Item = &ModeDiagnosis> {
        self.modes.iter().filter(|d| d.error().is_some())
    }
}

/// Features handed to the reducer
#[derive(Clone, Copy)]
enum Input<'a> {
    /// Canonical vector, projected onto each classifier's own schema
    Canonical(&'a FeatureVector),
    /// Row already laid out by the caller, used as is
    Row(&'a FeatureRow),
}

impl Input<'_> {
    fn row_for(&self, schema: &FeatureSchema) -> Cow<'_, FeatureRow> {
        match *self {
            Input::Canonical(features) => Cow::Owned(features.project(schema)),
            Input::Row(row) => Cow::Borrowed(row),
        }
    }
}

/// Score a single mode: schema check, invocation, output contract
fn score(
    classifier: &dyn Classifier,
    input: Input<'_>,
    threshold: f64,
) -> Result<(f64, bool), ModeError> {
    let expected = classifier.expected_schema();
    let row = input.row_for(expected);
    if expected != row.schema() {
        return Err(ModeError::FeatureContractMismatch {
            expected: expected.names().iter().map(|s| s.to_string()).collect(),
            actual: row.schema().names().iter().map(|s| s.to_string()).collect(),
        });
    }

    let proba = classifier
        .predict_proba(row.values())
        .map_err(|e| ModeError::ClassifierInvocation(e.to_string()))?;

    if proba.len() != 2 {
        return Err(ModeError::ClassifierInvocation(format!(
            "expected 2 class probabilities, got {}",
            proba.len()
        )));
    }

    let probability = proba[1];
    if !(0.0..=1.0).contains(&probability) {
        return Err(ModeError::ClassifierInvocation(format!(
            "positive-class probability {} outside [0, 1]",
            probability
        )));
    }

    // Strict: a probability equal to the threshold is not a failure
    Ok((probability, probability > threshold))
}

/// Diagnose one sample's features against the registry.
///
/// Each classifier receives the columns of its own declared schema, so a
/// bundle may mix raw and extended models. An absent or empty registry yields
/// an `Unavailable` result with no entries. Otherwise every mode of
/// [`FailureMode::ALL`] gets exactly one entry, in order, and only scored
/// entries feed the aggregate.
pub fn diagnose(
    features: &FeatureVector,
    registry: Option<&ClassifierRegistry>,
    threshold: f64,
) -> DiagnosisResult {
    reduce(Input::Canonical(features), registry, threshold)
}

/// Diagnose a row laid out by the caller.
///
/// The row is fed unchanged; a classifier whose schema differs in names,
/// order or count fails with [`ModeError::FeatureContractMismatch`].
pub fn diagnose_row(
    row: &FeatureRow,
    registry: Option<&ClassifierRegistry>,
    threshold: f64,
) -> DiagnosisResult {
    reduce(Input::Row(row), registry, threshold)
}

fn reduce(
    input: Input<'_>,
    registry: Option<&ClassifierRegistry>,
    threshold: f64,
) -> DiagnosisResult {
    let registry = match registry {
        Some(registry) if !registry.is_empty() => registry,
        _ => return DiagnosisResult::unavailable(threshold),
    };

    let mut modes = Vec::with_capacity(FailureMode::ALL.len());
    let mut aggregate_is_failing = false;
    let mut aggregate_max_probability: Option<f64> = None;
    let mut primary_cause = None;

    for mode in FailureMode::ALL {
        let scored = match registry.get(mode) {
            Some(classifier) => score(classifier, input, threshold),
            None => Err(ModeError::ModeNotFound),
        };

        let outcome = match scored {
            Ok((probability, is_failing)) => {
                aggregate_is_failing |= is_failing;
                aggregate_max_probability = Some(match aggregate_max_probability {
                    Some(max) => max.max(probability),
                    None => probability,
                });
                if is_failing && primary_cause.is_none() {
                    primary_cause = Some(mode);
                }
                ModeOutcome::Scored {
                    probability,
                    is_failing,
                }
            }
            Err(error) => ModeOutcome::Failed { error },
        };

        modes.push(ModeDiagnosis { mode, outcome });
    }

    DiagnosisResult {
        status: DiagnosisStatus::Available,
        threshold,
        modes,
        aggregate_is_failing,
        aggregate_max_probability,
        primary_cause,
    }
}

/// Predictor bound to a decision threshold
#[derive(Debug, Clone, Copy)]
pub struct FailurePredictor {
    threshold: f64,
}

impl FailurePredictor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn diagnose(
        &self,
        features: &FeatureVector,
        registry: Option<&ClassifierRegistry>,
    ) -> DiagnosisResult {
        diagnose(features, registry, self.threshold)
    }
}

impl Default for FailurePredictor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ConstantClassifier, LogisticClassifier};
    use crate::InferenceError;
    use feature_engine::{compute_features, FeatureEngineer, OperatingSample};

    #[derive(Debug)]
    struct BrokenClassifier(FeatureSchema);

    impl Classifier for BrokenClassifier {
        fn expected_schema(&self) -> &FeatureSchema {
            &self.0
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError::InferenceFailed("tensor shape error".into()))
        }
    }

    fn features() -> FeatureVector {
        compute_features(&OperatingSample::default())
    }

    fn row() -> FeatureRow {
        FeatureEngineer::new(FeatureSchema::extended()).compute(&OperatingSample::default())
    }

    fn constant(p: f64) -> Box<dyn Classifier> {
        Box::new(ConstantClassifier::positive(FeatureSchema::extended(), p))
    }

    fn registry(probabilities: [f64; 4]) -> ClassifierRegistry {
        FailureMode::ALL
            .into_iter()
            .zip(probabilities)
            .fold(ClassifierRegistry::new(FeatureSchema::extended()), |r, (mode, p)| {
                r.with(mode, constant(p))
            })
    }

    #[test]
    fn test_single_mode_above_threshold_raises_alarm() {
        let result = diagnose(&features(), Some(&registry([0.85, 0.1, 0.1, 0.1])), 0.5);

        assert_eq!(result.status, DiagnosisStatus::Available);
        assert!(result.aggregate_is_failing);
        assert_eq!(result.aggregate_max_probability, Some(0.85));
        assert_eq!(result.primary_cause, Some(FailureMode::ToolWear));
        assert_eq!(result.modes.len(), 4);
        assert!(result.modes[0].is_failing());
        assert!(result.modes[1..].iter().all(|d| !d.is_failing()));
    }

    #[test]
    fn test_primary_cause_is_first_in_order() {
        let result = diagnose(&features(), Some(&registry([0.2, 0.6, 0.9, 0.7])), 0.5);
        assert_eq!(result.primary_cause, Some(FailureMode::HeatDissipation));
        assert_eq!(result.aggregate_max_probability, Some(0.9));
    }

    #[test]
    fn test_all_below_threshold() {
        let result = diagnose(&features(), Some(&registry([0.1, 0.2, 0.3, 0.4])), 0.5);
        assert!(!result.aggregate_is_failing);
        assert_eq!(result.primary_cause, None);
        assert_eq!(result.aggregate_max_probability, Some(0.4));
    }

    #[test]
    fn test_probability_equal_to_threshold_is_not_failing() {
        let result = diagnose(&features(), Some(&registry([0.5, 0.5, 0.5, 0.5])), 0.5);
        assert!(!result.aggregate_is_failing);
        assert!(result.modes.iter().all(|d| !d.is_failing()));
        assert_eq!(result.aggregate_max_probability, Some(0.5));
    }

    #[test]
    fn test_missing_mode_is_isolated() {
        let registry = ClassifierRegistry::new(FeatureSchema::extended())
            .with(FailureMode::ToolWear, constant(0.3))
            .with(FailureMode::Power, constant(0.7))
            .with(FailureMode::Overstrain, constant(0.1));

        let result = diagnose(&features(), Some(&registry), 0.5);

        assert_eq!(result.modes.len(), 4);
        assert_eq!(
            result.modes.iter().map(|d| d.mode).collect::<Vec<_>>(),
            FailureMode::ALL.to_vec()
        );
        assert_eq!(result.modes[1].error(), Some(&ModeError::ModeNotFound));
        assert_eq!(result.errors().count(), 1);
        assert!(result.aggregate_is_failing);
        assert_eq!(result.aggregate_max_probability, Some(0.7));
        assert_eq!(result.primary_cause, Some(FailureMode::Power));
    }

    #[test]
    fn test_absent_registry_is_unavailable() {
        let result = diagnose(&features(), None, 0.5);
        assert_eq!(result, DiagnosisResult::unavailable(0.5));
        assert!(result.modes.is_empty());
        assert_eq!(result.aggregate_max_probability, None);
    }

    #[test]
    fn test_empty_registry_is_unavailable() {
        let empty = ClassifierRegistry::new(FeatureSchema::extended());
        let result = diagnose(&features(), Some(&empty), 0.5);
        assert_eq!(result.status, DiagnosisStatus::Unavailable);
        assert!(result.modes.is_empty());
    }

    #[test]
    fn test_schema_mismatch_fails_loudly() {
        let registry = registry([0.1, 0.1, 0.1, 0.1]).with(
            FailureMode::HeatDissipation,
            Box::new(ConstantClassifier::positive(FeatureSchema::raw(), 0.99)),
        );

        let result = diagnose_row(&row(), Some(&registry), 0.5);

        match result.modes[1].error() {
            Some(ModeError::FeatureContractMismatch { expected, actual }) => {
                assert_eq!(expected.len(), 6);
                assert_eq!(actual.len(), 9);
            }
            other => panic!("expected contract mismatch, got {:?}", other),
        }
        assert!(!result.aggregate_is_failing);
        assert_eq!(result.aggregate_max_probability, Some(0.1));
    }

    #[test]
    fn test_same_columns_different_order_is_mismatch() {
        let reordered = FeatureSchema::from_names(&[
            "type_encoded",
            "air_temp_k",
            "process_temp_k",
            "rotational_speed_rpm",
            "torque_nm",
            "tool_wear_min",
            "temp_delta",
            "power_w",
            "wear_torque_product",
        ])
        .unwrap();
        let registry = registry([0.1, 0.1, 0.1, 0.1]).with(
            FailureMode::ToolWear,
            Box::new(ConstantClassifier::positive(reordered, 0.9)),
        );
        let result = diagnose_row(&row(), Some(&registry), 0.5);
        assert!(matches!(
            result.modes[0].error(),
            Some(ModeError::FeatureContractMismatch { .. })
        ));
    }

    #[test]
    fn test_invocation_errors_are_isolated() {
        let registry = registry([0.9, 0.1, 0.1, 0.1])
            .with(
                FailureMode::Power,
                Box::new(BrokenClassifier(FeatureSchema::extended())),
            )
            .with(
                FailureMode::Overstrain,
                Box::new(ConstantClassifier::new(
                    FeatureSchema::extended(),
                    vec![0.2, 0.3, 0.5],
                )),
            );

        let result = diagnose(&features(), Some(&registry), 0.5);

        match result.modes[2].error() {
            Some(ModeError::ClassifierInvocation(msg)) => assert!(msg.contains("tensor shape")),
            other => panic!("expected invocation error, got {:?}", other),
        }
        assert!(matches!(
            result.modes[3].error(),
            Some(ModeError::ClassifierInvocation(_))
        ));
        assert_eq!(result.primary_cause, Some(FailureMode::ToolWear));
        assert_eq!(result.aggregate_max_probability, Some(0.9));
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let registry = registry([0.1, 0.1, 0.1, 0.1])
            .with(FailureMode::ToolWear, constant(1.5))
            .with(
                FailureMode::Power,
                Box::new(ConstantClassifier::new(
                    FeatureSchema::extended(),
                    vec![0.0, f64::NAN],
                )),
            );
        let result = diagnose(&features(), Some(&registry), 0.5);
        assert!(result.modes[0].error().is_some());
        assert!(result.modes[2].error().is_some());
        assert!(!result.aggregate_is_failing);
    }

    #[test]
    fn test_all_modes_failed_has_no_aggregate() {
        let registry = ClassifierRegistry::new(FeatureSchema::extended()).with(
            FailureMode::Overstrain,
            Box::new(BrokenClassifier(FeatureSchema::extended())),
        );
        let result = diagnose(&features(), Some(&registry), 0.5);
        assert_eq!(result.status, DiagnosisStatus::Available);
        assert_eq!(result.errors().count(), 4);
        assert_eq!(result.aggregate_max_probability, None);
        assert!(!result.aggregate_is_failing);
    }

    #[test]
    fn test_repeated_diagnosis_is_identical() {
        let registry = registry([0.85, 0.1, 0.55, 0.1]);
        let predictor = FailurePredictor::default();
        let sample = OperatingSample {
            torque_nm: 65.0,
            tool_wear_min: 210,
            ..Default::default()
        };

        let first = predictor.diagnose(&compute_features(&sample), Some(&registry));
        let second = predictor.diagnose(&compute_features(&sample), Some(&registry));
        assert_eq!(first, second);
    }

    #[test]
    fn test_mixed_layout_models_are_each_scored() {
        let registry = registry([0.1, 0.1, 0.1, 0.1])
            .with(
                FailureMode::ToolWear,
                Box::new(ConstantClassifier::positive(FeatureSchema::raw(), 0.9)),
            )
            .with(
                FailureMode::Power,
                Box::new(LogisticClassifier::new(
                    FeatureSchema::from_names(&["power_w"]).unwrap(),
                    vec![0.001],
                    -5.0,
                )
                .unwrap()),
            );

        let result = diagnose(&features(), Some(&registry), 0.5);

        assert_eq!(result.errors().count(), 0);
        assert_eq!(result.mode(FailureMode::ToolWear).unwrap().probability(), Some(0.9));
        let power = result.mode(FailureMode::Power).unwrap().probability().unwrap();
        let expected = 1.0 / (1.0 + (-(0.001 * features().power_w - 5.0)).exp());
        assert!((power - expected).abs() < 1e-12);
        assert_eq!(result.primary_cause, Some(FailureMode::ToolWear));
    }

    #[test]
    fn test_reordered_schema_receives_its_own_order() {
        let reordered =
            FeatureSchema::from_names(&["tool_wear_min", "type_encoded", "air_temp_k"]).unwrap();
        let registry = ClassifierRegistry::new(FeatureSchema::extended()).with(
            FailureMode::ToolWear,
            Box::new(LogisticClassifier::new(reordered, vec![0.0, 0.0, 0.01], -3.0).unwrap()),
        );
        let result = diagnose(&features(), Some(&registry), 0.5);
        // air_temp_k = 300 sits in the third slot
        let probability = result.mode(FailureMode::ToolWear).unwrap().probability().unwrap();
        assert!((probability - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_result_serializes_flat_mode_entries() {
        let registry = ClassifierRegistry::new(FeatureSchema::extended())
            .with(FailureMode::ToolWear, constant(0.75));
        let result = diagnose(&features(), Some(&registry), 0.5);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "available");
        assert_eq!(json["primary_cause"], "tool_wear_failure");
        assert_eq!(json["modes"][0]["mode"], "tool_wear_failure");
        assert_eq!(json["modes"][0]["status"], "scored");
        assert_eq!(json["modes"][0]["probability"], 0.75);
        assert_eq!(json["modes"][1]["status"], "failed");
        assert_eq!(json["modes"][1]["error"]["kind"], "mode_not_found");
    }
}
