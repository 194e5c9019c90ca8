//! Model Bundle Manifest
//!
//! JSON description of the externally trained classifiers:
//!
//! ```json
//! {
//!   "layout": "extended",
//!   "key_aliases": { "Falla_Desgaste (TWF)": "tool_wear_failure" },
//!   "models": {
//!     "Falla_Desgaste (TWF)": { "kind": "logistic", "coefficients": [...], "intercept": -4.2 },
//!     "Falla_Calor (HDF)": { "kind": "onnx", "path": "hdf.onnx" }
//!   }
//! }
//! ```

use crate::classifier::{
    Classifier, ConstantClassifier, ForestClassifier, LogisticClassifier, TreeNode,
};
use crate::mode::FailureMode;
use crate::onnx::OnnxClassifier;
use crate::InferenceError;
use feature_engine::{FeatureLayout, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

fn default_output_index() -> usize {
    1
}

/// Description of one classifier in the bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierSpec {
    /// Inline logistic regression
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default)]
        columns: Option<FeatureSchema>,
    },
    /// Inline tree ensemble
    Forest {
        trees: Vec<Vec<TreeNode>>,
        #[serde(default)]
        columns: Option<FeatureSchema>,
    },
    /// ONNX file, path relative to the manifest
    Onnx {
        path: PathBuf,
        #[serde(default = "default_output_index")]
        output_index: usize,
        #[serde(default)]
        columns: Option<FeatureSchema>,
    },
    /// Fixed probabilities
    Constant {
        probabilities: Vec<f64>,
        #[serde(default)]
        columns: Option<FeatureSchema>,
    },
}

impl ClassifierSpec {
    /// Training-time columns declared for this model, if any
    pub fn columns(&self) -> Option<&FeatureSchema> {
        match self {
            ClassifierSpec::Logistic { columns, .. }
            | ClassifierSpec::Forest { columns, .. }
            | ClassifierSpec::Onnx { columns, .. }
            | ClassifierSpec::Constant { columns, .. } => columns.as_ref(),
        }
    }

    /// Instantiate the classifier.
    ///
    /// Models without their own `columns` inherit `bundle_schema`.
    pub fn build(
        &self,
        bundle_schema: &FeatureSchema,
        base_dir: &Path,
    ) -> Result<Box<dyn Classifier>, InferenceError> {
        let schema = self.columns().unwrap_or(bundle_schema).clone();

        let classifier: Box<dyn Classifier> = match self {
            ClassifierSpec::Logistic {
                coefficients,
                intercept,
                ..
            } => Box::new(LogisticClassifier::new(schema, coefficients.clone(), *intercept)?),
            ClassifierSpec::Forest { trees, .. } => {
                Box::new(ForestClassifier::new(schema, trees.clone())?)
            }
            ClassifierSpec::Onnx {
                path, output_index, ..
            } => Box::new(OnnxClassifier::load(&base_dir.join(path), schema, *output_index)?),
            ClassifierSpec::Constant { probabilities, .. } => {
                Box::new(ConstantClassifier::new(schema, probabilities.clone()))
            }
        };

        Ok(classifier)
    }
}

/// Parsed model bundle manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Named layout used when `columns` is absent
    #[serde(default)]
    pub layout: FeatureLayout,
    /// Explicit column order, overrides `layout`
    #[serde(default)]
    pub columns: Option<FeatureSchema>,
    /// Artifact key to failure mode translations
    #[serde(default)]
    pub key_aliases: BTreeMap<String, FailureMode>,
    /// Classifiers by artifact key
    pub models: BTreeMap<String, ClassifierSpec>,
}

impl ModelBundle {
    /// Parse a manifest from JSON text
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(json).map_err(|e| InferenceError::ArtifactInvalid(e.to_string()))
    }

    /// Read and parse a manifest file
    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| InferenceError::ArtifactMissing {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Feature schema rows must follow for this bundle
    pub fn schema(&self) -> FeatureSchema {
        self.columns.clone().unwrap_or_else(|| self.layout.schema())
    }

    /// Translate an artifact key, explicit aliases first
    pub fn resolve_mode(&self, key: &str) -> Option<FailureMode> {
        self.key_aliases
            .get(key)
            .copied()
            .or_else(|| FailureMode::from_key(key))
    }
}
