//! Rule-Based Fallback System
//!
//! Provides a coarse heuristic risk estimate when the failure classifiers are
//! unavailable. It never feeds into a model diagnosis.

mod rules;

pub use rules::{FallbackConfig, FallbackEngine, HeuristicAssessment, Trigger};
