//! HTTP Routes

pub mod diagnosis;
pub mod features;
