//! Alerting System
//!
//! Maps a diagnosis to a plant alert severity and an operator recommendation.

mod manager;

pub use manager::{AlertConfig, AlertManager, PlantAlert, Severity};
