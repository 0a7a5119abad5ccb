//! Data ingestion and cleaning layer.

pub mod clean;
pub mod scrape;
