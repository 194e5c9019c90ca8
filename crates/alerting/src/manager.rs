//! Alert Manager Implementation

use inference_engine::{DiagnosisResult, FailureMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Max probability at which a non-failing plant is still worth watching (default: 0.30)
    pub watch_threshold: f64,
    /// Max probability at which a failing plant is critical (default: 0.80)
    pub critical_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            watch_threshold: 0.30,
            critical_threshold: 0.80,
        }
    }
}

/// Plant alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No model output to judge
    Unknown,
    Normal,
    Elevated,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Normal => "normal",
            Severity::Elevated => "elevated",
            Severity::Critical => "critical",
        }
    }
}

/// Operator-facing alert derived from a diagnosis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantAlert {
    pub severity: Severity,
    pub headline: String,
    pub recommendation: String,
    pub primary_cause: Option<FailureMode>,
}

/// Turns diagnoses into plant alerts
#[derive(Debug, Clone, Default)]
pub struct AlertManager {
    config: AlertConfig,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Get severity level for a diagnosis
    pub fn severity(&self, diagnosis: &DiagnosisResult) -> Severity {
        let Some(max) = diagnosis.aggregate_max_probability else {
            return Severity::Unknown;
        };

        if diagnosis.aggregate_is_failing {
            if max >= self.config.critical_threshold {
                Severity::Critical
            } else {
                Severity::Elevated
            }
        } else if max >= self.config.watch_threshold {
            Severity::Elevated
        } else {
            Severity::Normal
        }
    }

    /// Build the alert shown to the operator
    pub fn evaluate(&self, diagnosis: &DiagnosisResult) -> PlantAlert {
        let severity = self.severity(diagnosis);
        debug!(
            "Diagnosis mapped to {} (max={:?}, cause={:?})",
            severity.as_str(),
            diagnosis.aggregate_max_probability,
            diagnosis.primary_cause
        );

        let (headline, recommendation) = match (severity, diagnosis.primary_cause) {
            (Severity::Unknown, _) if !diagnosis.is_available() => (
                "No failure model loaded".to_string(),
                "Install the classifier bundle to enable diagnosis".to_string(),
            ),
            (Severity::Unknown, _) => (
                "No failure mode could be evaluated".to_string(),
                "Check the classifier bundle against the feature layout".to_string(),
            ),
            (Severity::Critical, Some(cause)) => (
                format!("Critical alert: imminent {} likely", cause.abbreviation()),
                cause.recommended_action().to_string(),
            ),
            (_, Some(cause)) => (
                format!("Failure risk above threshold: {}", cause.abbreviation()),
                cause.recommended_action().to_string(),
            ),
            (Severity::Elevated, None) => (
                "Elevated failure risk".to_string(),
                "Keep monitoring; no mode above threshold".to_string(),
            ),
            (_, None) => (
                "Normal operation".to_string(),
                "No action required".to_string(),
            ),
        };

        PlantAlert {
            severity,
            headline,
            recommendation,
            primary_cause: diagnosis.primary_cause,
        }
    }
}
