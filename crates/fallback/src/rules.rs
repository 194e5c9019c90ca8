//! Heuristic Rules

use feature_engine::OperatingSample;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Heuristic limits and reported estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Limit on `torque × rpm` (no unit conversion)
    pub power_proxy_limit: f64,
    /// Tool wear limit (min)
    pub tool_wear_limit: u32,
    /// Estimate reported when a rule fires
    pub at_risk_estimate: f64,
    /// Estimate reported otherwise
    pub nominal_estimate: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            power_proxy_limit: 180_000.0,
            tool_wear_limit: 200,
            at_risk_estimate: 0.85,
            nominal_estimate: 0.02,
        }
    }
}

/// Rule that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Torque × rpm above the limit
    PowerProxy,
    /// Tool worn beyond the limit
    ToolWear,
}

impl Trigger {
    pub fn recommended_action(&self) -> &'static str {
        match self {
            Trigger::PowerProxy => "Reduce spindle load before continuing",
            Trigger::ToolWear => "Stop the line and inspect the tool",
        }
    }
}

/// Heuristic result, always labelled as such
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicAssessment {
    pub at_risk: bool,
    pub estimated_probability: f64,
    pub triggers: Vec<Trigger>,
    pub power_proxy: f64,
}

/// Rule engine used when no classifier is loaded
#[derive(Debug, Clone, Default)]
pub struct FallbackEngine {
    config: FallbackConfig,
}

impl FallbackEngine {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Apply the rules to a raw sample
    pub fn assess(&self, sample: &OperatingSample) -> HeuristicAssessment {
        let power_proxy = sample.torque_nm * f64::from(sample.rotational_speed_rpm);
        let mut triggers = Vec::new();

        if power_proxy > self.config.power_proxy_limit {
            triggers.push(Trigger::PowerProxy);
        }
        if sample.tool_wear_min > self.config.tool_wear_limit {
            triggers.push(Trigger::ToolWear);
        }

        let at_risk = !triggers.is_empty();
        debug!("Fallback assessment: at_risk={} triggers={:?}", at_risk, triggers);

        HeuristicAssessment {
            at_risk,
            estimated_probability: if at_risk {
                self.config.at_risk_estimate
            } else {
                self.config.nominal_estimate
            },
            triggers,
            power_proxy,
        }
    }
}
