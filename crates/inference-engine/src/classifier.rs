//! Binary Classifiers

use crate::InferenceError;
use feature_engine::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A trained classifier exposing class probabilities.
///
/// Implementations receive feature values laid out in `expected_schema()`
/// order and return one probability per class; binary classifiers return
/// `[p_negative, p_positive]`.
pub trait Classifier: Send + Sync + Debug {
    /// Column layout the classifier was trained on
    fn expected_schema(&self) -> &FeatureSchema;

    /// Class probabilities for one feature row
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

fn check_width(schema: &FeatureSchema, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != schema.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("[1, {}]", schema.len()),
            actual: format!("[1, {}]", features.len()),
        });
    }
    Ok(())
}

/// Logistic regression: `p = σ(w·x + b)`
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    schema: FeatureSchema,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(
        schema: FeatureSchema,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, InferenceError> {
        if coefficients.len() != schema.len() {
            return Err(InferenceError::ArtifactInvalid(format!(
                "logistic model has {} coefficients for {} columns",
                coefficients.len(),
                schema.len()
            )));
        }
        Ok(Self {
            schema,
            coefficients,
            intercept,
        })
    }
}

impl Classifier for LogisticClassifier {
    fn expected_schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(&self.schema, features)?;
        let logit: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        let p = 1.0 / (1.0 + (-logit).exp());
        Ok(vec![1.0 - p, p])
    }
}

/// Node of a decision tree in flattened scikit-learn layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (sample counts or probabilities)
    Leaf { value: Vec<f64> },
}

/// Tree ensemble averaging normalized leaf distributions (random forest)
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    schema: FeatureSchema,
    trees: Vec<Vec<TreeNode>>,
    n_classes: usize,
}

impl ForestClassifier {
    /// Build and validate a forest.
    ///
    /// Children must have a higher index than their parent, so every walk
    /// terminates.
    pub fn new(schema: FeatureSchema, trees: Vec<Vec<TreeNode>>) -> Result<Self, InferenceError> {
        if trees.is_empty() {
            return Err(InferenceError::ArtifactInvalid("forest has no trees".into()));
        }
        let mut n_classes = None;

        for (t, tree) in trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(InferenceError::ArtifactInvalid(format!("tree {} is empty", t)));
            }
            for (i, node) in tree.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= schema.len() {
                            return Err(InferenceError::ArtifactInvalid(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t,
                                i,
                                feature,
                                schema.len()
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.len() {
                                return Err(InferenceError::ArtifactInvalid(format!(
                                    "tree {} node {} has invalid child {}",
                                    t, i, child
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => match n_classes {
                        None if !value.is_empty() => n_classes = Some(value.len()),
                        Some(n) if n == value.len() => {}
                        _ => {
                            return Err(InferenceError::ArtifactInvalid(format!(
                                "tree {} node {} has {} class weights",
                                t,
                                i,
                                value.len()
                            )))
                        }
                    },
                }
            }
        }

        let n_classes = n_classes
            .ok_or_else(|| InferenceError::ArtifactInvalid("forest has no leaves".into()))?;

        Ok(Self {
            schema,
            trees,
            n_classes,
        })
    }

    fn leaf<'a>(tree: &'a [TreeNode], features: &[f64]) -> &'a [f64] {
        let mut idx = 0;
        loop {
            match &tree[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl Classifier for ForestClassifier {
    fn expected_schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(&self.schema, features)?;
        let mut proba = vec![0.0; self.n_classes];

        for tree in &self.trees {
            let value = Self::leaf(tree, features);
            let total: f64 = value.iter().sum();
            if total > 0.0 {
                for (acc, v) in proba.iter_mut().zip(value) {
                    *acc += v / total;
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

/// Classifier returning a fixed probability vector
#[derive(Debug, Clone)]
pub struct ConstantClassifier {
    schema: FeatureSchema,
    probabilities: Vec<f64>,
}

impl ConstantClassifier {
    /// Return `probabilities` for every input
    pub fn new(schema: FeatureSchema, probabilities: Vec<f64>) -> Self {
        Self {
            schema,
            probabilities,
        }
    }

    /// Binary classifier with a fixed positive-class probability
    pub fn positive(schema: FeatureSchema, probability: f64) -> Self {
        Self::new(schema, vec![1.0 - probability, probability])
    }
}

impl Classifier for ConstantClassifier {
    fn expected_schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(&self.schema, features)?;
        Ok(self.probabilities.clone())
    }
}
