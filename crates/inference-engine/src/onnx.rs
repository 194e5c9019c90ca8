//! ONNX Classifier (tract)

use crate::classifier::Classifier;
use crate::InferenceError;
use feature_engine::FeatureSchema;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;
use tract_onnx::prelude::*;

type OnnxRunner = Box<dyn Fn(TVec<TValue>) -> TractResult<TVec<TValue>> + Send + Sync>;

/// Classifier exported to ONNX (e.g. by skl2onnx with `zipmap=False`).
///
/// The model takes one `f32[1, width]` input. Class probabilities are read
/// from output `output_index`; skl2onnx emits labels at 0 and probabilities
/// at 1.
pub struct OnnxClassifier {
    schema: FeatureSchema,
    model_path: PathBuf,
    output_index: usize,
    run: OnnxRunner,
}

impl OnnxClassifier {
    /// Load and optimize the model at `path`
    pub fn load(
        path: &Path,
        schema: FeatureSchema,
        output_index: usize,
    ) -> Result<Self, InferenceError> {
        info!("Loading ONNX classifier: {}", path.display());

        if !path.is_file() {
            return Err(InferenceError::ArtifactMissing {
                path: path.display().to_string(),
                reason: "ONNX file not found".to_string(),
            });
        }

        let width = schema.len();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            schema,
            model_path: path.to_path_buf(),
            output_index,
            run: Box::new(move |inputs| plan.run(inputs)),
        })
    }
}

impl fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_path", &self.model_path)
            .field("output_index", &self.output_index)
            .field("columns", &self.schema.names())
            .finish()
    }
}

impl Classifier for OnnxClassifier {
    fn expected_schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let width = self.schema.len();
        if features.len() != width {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", width),
                actual: format!("[1, {}]", features.len()),
            });
        }

        let values: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, width), values)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();

        let outputs = (self.run)(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs.get(self.output_index).ok_or_else(|| {
            InferenceError::InferenceFailed(format!(
                "model has {} outputs, probabilities expected at index {}",
                outputs.len(),
                self.output_index
            ))
        })?;

        let proba = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        Ok(proba.iter().map(|&p| f64::from(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ModelBundle;
    use crate::mode::FailureMode;
    use crate::registry::ClassifierRegistry;
    use feature_engine::{compute_features, OperatingSample};

    // softmax(x · W + b) over the extended columns; only tool_wear_min has a
    // weight (1/64) and b = [0, -3]. Output 0 is the logits, output 1 the
    // probabilities.
    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    fn model(output_index: usize) -> OnnxClassifier {
        OnnxClassifier::load(
            &fixtures().join("tool_wear_softmax.onnx"),
            FeatureSchema::extended(),
            output_index,
        )
        .unwrap()
    }

    fn worn_tool() -> Vec<f64> {
        let sample = OperatingSample {
            tool_wear_min: 256,
            ..Default::default()
        };
        compute_features(&sample)
            .project(&FeatureSchema::extended())
            .values()
            .to_vec()
    }

    #[test]
    fn test_missing_file_is_artifact_missing() {
        let err = OnnxClassifier::load(
            Path::new("/nonexistent/twf.onnx"),
            FeatureSchema::extended(),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactMissing { .. }));
    }

    #[test]
    fn test_probabilities_read_from_output_one() {
        let proba = model(1).predict_proba(&worn_tool()).unwrap();

        let expected = 1.0_f64.exp() / (1.0 + 1.0_f64.exp());
        assert_eq!(proba.len(), 2);
        assert!((proba[1] - expected).abs() < 1e-5);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_output_index_selects_tensor() {
        let logits = model(0).predict_proba(&worn_tool()).unwrap();
        assert!((logits[0] - 0.0).abs() < 1e-5);
        assert!((logits[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_output_is_inference_failure() {
        let err = model(2).predict_proba(&worn_tool()).unwrap_err();
        match err {
            InferenceError::InferenceFailed(msg) => assert!(msg.contains("2 outputs")),
            other => panic!("expected InferenceFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_width_rejected() {
        let err = model(1).predict_proba(&[0.0; 6]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInputShape { .. }));
    }

    #[test]
    fn test_bundle_resolves_onnx_path_relative_to_manifest() {
        let bundle = ModelBundle::from_json(
            r#"{ "models": { "TWF": { "kind": "onnx", "path": "tool_wear_softmax.onnx" } } }"#,
        )
        .unwrap();
        let registry = ClassifierRegistry::from_bundle(&bundle, &fixtures()).unwrap();

        let diagnosis = crate::diagnose(
            &compute_features(&OperatingSample::default()),
            Some(&registry),
            0.5,
        );
        let twf = diagnosis.mode(FailureMode::ToolWear).unwrap();
        let expected = (-3.0_f64).exp() / (1.0 + (-3.0_f64).exp());
        assert!((twf.probability().unwrap() - expected).abs() < 1e-5);
        assert!(!twf.is_failing());
    }
}
