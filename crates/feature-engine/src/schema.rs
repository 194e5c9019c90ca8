//! Feature Column Schema
//!
//! The column set and order fed to a classifier must match what it was
//! trained on. Model bundles name columns inconsistently (`type` vs
//! `type_encoded`, dataset headers such as `Torque [Nm]`), so every external
//! name is translated to a [`FeatureColumn`] here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors while building a feature schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown feature column: {0}")]
    UnknownColumn(String),
    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(FeatureColumn),
    #[error("Feature schema has no columns")]
    Empty,
}

/// One canonical feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureColumn {
    AirTemperature,
    ProcessTemperature,
    RotationalSpeed,
    Torque,
    ToolWear,
    ProductType,
    TempDelta,
    Power,
    WearTorque,
}

impl FeatureColumn {
    /// All columns in canonical order
    pub const ALL: [FeatureColumn; 9] = [
        FeatureColumn::AirTemperature,
        FeatureColumn::ProcessTemperature,
        FeatureColumn::RotationalSpeed,
        FeatureColumn::Torque,
        FeatureColumn::ToolWear,
        FeatureColumn::ProductType,
        FeatureColumn::TempDelta,
        FeatureColumn::Power,
        FeatureColumn::WearTorque,
    ];

    /// Canonical column name
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::AirTemperature => "air_temp_k",
            FeatureColumn::ProcessTemperature => "process_temp_k",
            FeatureColumn::RotationalSpeed => "rotational_speed_rpm",
            FeatureColumn::Torque => "torque_nm",
            FeatureColumn::ToolWear => "tool_wear_min",
            FeatureColumn::ProductType => "type_encoded",
            FeatureColumn::TempDelta => "temp_delta",
            FeatureColumn::Power => "power_w",
            FeatureColumn::WearTorque => "wear_torque_product",
        }
    }

    /// Whether the column is derived rather than read from the sample
    pub fn is_engineered(&self) -> bool {
        matches!(
            self,
            FeatureColumn::TempDelta | FeatureColumn::Power | FeatureColumn::WearTorque
        )
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureColumn {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim() {
            "air_temp_k" | "air_temperature" | "Air temperature [K]" => {
                FeatureColumn::AirTemperature
            }
            "process_temp_k" | "process_temperature" | "Process temperature [K]" => {
                FeatureColumn::ProcessTemperature
            }
            "rotational_speed_rpm" | "rpm" | "Rotational speed [rpm]" => {
                FeatureColumn::RotationalSpeed
            }
            "torque_nm" | "torque" | "Torque [Nm]" => FeatureColumn::Torque,
            "tool_wear_min" | "tool_wear" | "Tool wear [min]" => FeatureColumn::ToolWear,
            "type_encoded" | "type" | "Type" => FeatureColumn::ProductType,
            "temp_delta" | "temp_diff" | "Temperature difference [K]" => FeatureColumn::TempDelta,
            "power_w" | "power" | "Power [W]" => FeatureColumn::Power,
            "wear_torque_product" | "wear_torque" | "Tool wear * Torque" => {
                FeatureColumn::WearTorque
            }
            other => return Err(SchemaError::UnknownColumn(other.to_string())),
        };
        Ok(column)
    }
}

impl TryFrom<String> for FeatureColumn {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeatureColumn> for String {
    fn from(column: FeatureColumn) -> Self {
        column.as_str().to_string()
    }
}

/// Named column layouts a model bundle can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureLayout {
    /// Five readings plus the encoded product type
    Raw,
    /// Raw layout followed by the three engineered columns
    #[default]
    Extended,
}

impl FeatureLayout {
    pub fn schema(&self) -> FeatureSchema {
        match self {
            FeatureLayout::Raw => FeatureSchema::raw(),
            FeatureLayout::Extended => FeatureSchema::extended(),
        }
    }
}

/// Ordered, duplicate-free list of feature columns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureColumn>", into = "Vec<FeatureColumn>")]
pub struct FeatureSchema {
    columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Create a schema from an explicit column order
    pub fn new(columns: Vec<FeatureColumn>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SchemaError::DuplicateColumn(*column));
            }
        }
        Ok(Self { columns })
    }

    /// Parse a schema from external column names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SchemaError> {
        let columns = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    /// Six raw columns: the five readings plus the encoded product type
    pub fn raw() -> Self {
        Self {
            columns: FeatureColumn::ALL[..6].to_vec(),
        }
    }

    /// Nine columns: the raw layout followed by the engineered columns
    pub fn extended() -> Self {
        Self {
            columns: FeatureColumn::ALL.to_vec(),
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Canonical names in schema order
    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.as_str()).collect()
    }

    /// Position of a column within the schema
    pub fn position(&self, column: FeatureColumn) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::extended()
    }
}

impl TryFrom<Vec<FeatureColumn>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(columns: Vec<FeatureColumn>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<FeatureColumn> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_widths() {
        assert_eq!(FeatureSchema::raw().len(), 6);
        assert_eq!(FeatureSchema::extended().len(), 9);
        assert!(FeatureSchema::raw()
            .columns()
            .iter()
            .all(|c| !c.is_engineered()));
    }

    #[test]
    fn test_layout_selects_schema() {
        assert_eq!(FeatureLayout::Raw.schema(), FeatureSchema::raw());
        assert_eq!(FeatureLayout::default().schema(), FeatureSchema::extended());
        let layout: FeatureLayout = serde_json::from_str("\"raw\"").unwrap();
        assert_eq!(layout, FeatureLayout::Raw);
    }

    #[test]
    fn test_type_aliases_resolve_to_same_column() {
        let a: FeatureColumn = "type".parse().unwrap();
        let b: FeatureColumn = "type_encoded".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, FeatureColumn::ProductType);
    }

    #[test]
    fn test_dataset_headers_parse() {
        let schema = FeatureSchema::from_names(&[
            "Type",
            "Air temperature [K]",
            "Process temperature [K]",
            "Rotational speed [rpm]",
            "Torque [Nm]",
            "Tool wear [min]",
        ])
        .unwrap();
        assert_eq!(schema.position(FeatureColumn::ProductType), Some(0));
        assert_eq!(schema.position(FeatureColumn::Power), None);
    }

    #[test]
    fn test_rejects_duplicates_and_unknowns() {
        assert_eq!(
            FeatureSchema::from_names(&["torque", "torque_nm"]),
            Err(SchemaError::DuplicateColumn(FeatureColumn::Torque))
        );
        assert!(matches!(
            FeatureSchema::from_names(&["humidity"]),
            Err(SchemaError::UnknownColumn(_))
        ));
        assert_eq!(FeatureSchema::new(vec![]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_schema_serializes_as_canonical_names() {
        let schema = FeatureSchema::from_names(&["type", "torque"]).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"["type_encoded","torque_nm"]"#);
        let back: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
