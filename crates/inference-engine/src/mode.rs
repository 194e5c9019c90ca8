//! Failure Modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Machine failure category, each modeled by its own binary classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FailureMode {
    /// Tool wear failure (TWF)
    ToolWear,
    /// Heat dissipation failure (HDF)
    HeatDissipation,
    /// Power failure (PWF)
    Power,
    /// Overstrain failure (OSF)
    Overstrain,
}

impl FailureMode {
    /// Evaluation order. Primary-cause selection depends on it.
    pub const ALL: [FailureMode; 4] = [
        FailureMode::ToolWear,
        FailureMode::HeatDissipation,
        FailureMode::Power,
        FailureMode::Overstrain,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::ToolWear => "tool_wear_failure",
            FailureMode::HeatDissipation => "heat_dissipation_failure",
            FailureMode::Power => "power_failure",
            FailureMode::Overstrain => "overstrain_failure",
        }
    }

    /// Dataset abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            FailureMode::ToolWear => "TWF",
            FailureMode::HeatDissipation => "HDF",
            FailureMode::Power => "PWF",
            FailureMode::Overstrain => "OSF",
        }
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        match self {
            FailureMode::ToolWear => "Stop the line and replace or inspect the cutting tool",
            FailureMode::HeatDissipation => {
                "Check cooling and ventilation, reduce process temperature gap"
            }
            FailureMode::Power => "Adjust spindle speed or torque back into the rated power band",
            FailureMode::Overstrain => "Reduce load on the worn tool, schedule tool change",
        }
    }

    /// Recognize an artifact key.
    ///
    /// Accepts canonical names, short names, dataset abbreviations and the
    /// Spanish dashboard labels (`Falla_Desgaste (TWF)` and friends).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let mode = match key {
            "tool_wear_failure" | "tool_wear" | "TWF" | "Falla_Desgaste (TWF)" => {
                FailureMode::ToolWear
            }
            "heat_dissipation_failure" | "heat_dissipation" | "HDF" | "Falla_Calor (HDF)" => {
                FailureMode::HeatDissipation
            }
            "power_failure" | "power" | "PWF" | "Falla_Potencia (PWF)" => FailureMode::Power,
            "overstrain_failure" | "overstrain" | "OSF" | "Falla_Sobreesfuerzo (OSF)" => {
                FailureMode::Overstrain
            }
            _ => return None,
        };
        Some(mode)
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown failure mode: {}", s))
    }
}

impl TryFrom<String> for FailureMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FailureMode> for String {
    fn from(mode: FailureMode) -> Self {
        mode.as_str().to_string()
    }
}
