//! Analysis layer: descriptive statistics, anomaly detection, chart payloads.

pub mod anomaly;
pub mod charts;
pub mod stats;
