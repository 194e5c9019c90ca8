//! Classifier Registry

use crate::classifier::Classifier;
use crate::manifest::ModelBundle;
use crate::mode::FailureMode;
use crate::InferenceError;
use feature_engine::FeatureSchema;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Read-only set of loaded classifiers keyed by failure mode
#[derive(Debug, Default)]
pub struct ClassifierRegistry {
    schema: FeatureSchema,
    classifiers: HashMap<FailureMode, Box<dyn Classifier>>,
}

impl ClassifierRegistry {
    /// Create an empty registry whose rows follow `schema`
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            classifiers: HashMap::new(),
        }
    }

    /// Builder-style insert, replacing any previous classifier for `mode`
    pub fn with(mut self, mode: FailureMode, classifier: Box<dyn Classifier>) -> Self {
        self.insert(mode, classifier);
        self
    }

    pub fn insert(&mut self, mode: FailureMode, classifier: Box<dyn Classifier>) {
        self.classifiers.insert(mode, classifier);
    }

    /// Load a model bundle manifest from disk
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading model bundle: {}", path.display());
        let bundle = ModelBundle::from_path(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_bundle(&bundle, base_dir)
    }

    /// Instantiate every recognized classifier of a parsed bundle.
    ///
    /// Unrecognized keys are skipped with a warning. Two keys resolving to the
    /// same failure mode make the bundle invalid.
    pub fn from_bundle(bundle: &ModelBundle, base_dir: &Path) -> Result<Self, InferenceError> {
        let schema = bundle.schema();
        let mut registry = Self::new(schema.clone());
        let mut sources: HashMap<FailureMode, &str> = HashMap::new();

        for (key, spec) in &bundle.models {
            let Some(mode) = bundle.resolve_mode(key) else {
                warn!("Ignoring model with unrecognized key: {}", key);
                continue;
            };

            if let Some(previous) = sources.insert(mode, key) {
                return Err(InferenceError::ArtifactInvalid(format!(
                    "keys '{}' and '{}' both map to {}",
                    previous, key, mode
                )));
            }

            let classifier = spec.build(&schema, base_dir)?;
            info!(
                "Loaded {} classifier from key '{}' ({} columns)",
                mode,
                key,
                classifier.expected_schema().len()
            );
            registry.insert(mode, classifier);
        }

        let missing: Vec<&str> = FailureMode::ALL
            .iter()
            .filter(|m| !registry.classifiers.contains_key(*m))
            .map(|m| m.as_str())
            .collect();
        if !missing.is_empty() {
            warn!("Model bundle has no classifier for: {}", missing.join(", "));
        }

        Ok(registry)
    }

    /// Feature schema rows must follow for this registry
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Look up the classifier for a failure mode
    pub fn get(&self, mode: FailureMode) -> Option<&dyn Classifier> {
        self.classifiers.get(&mode).map(|c| c.as_ref())
    }

    /// Loaded modes, in evaluation order
    pub fn modes(&self) -> Vec<FailureMode> {
        FailureMode::ALL
            .into_iter()
            .filter(|m| self.classifiers.contains_key(m))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

/// Registry loaded at most once and shared across request handlers.
///
/// A failed load is remembered: every later `get` returns `None` without
/// touching the filesystem again.
#[derive(Debug)]
pub struct SharedRegistry {
    path: PathBuf,
    cell: OnceLock<Option<Arc<ClassifierRegistry>>>,
}

impl SharedRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Wrap an already built registry
    pub fn preloaded(registry: ClassifierRegistry) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Some(Arc::new(registry)));
        Self {
            path: PathBuf::new(),
            cell,
        }
    }

    /// The loaded registry, or `None` when the artifact is unavailable
    pub fn get(&self) -> Option<Arc<ClassifierRegistry>> {
        self.cell
            .get_or_init(|| match ClassifierRegistry::load(&self.path) {
                Ok(registry) => Some(Arc::new(registry)),
                Err(e) => {
                    warn!("Model bundle unavailable, diagnoses will report no model: {}", e);
                    None
                }
            })
            .clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
