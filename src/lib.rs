//! Library surface for the IMDB chart pipeline.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod logging;
pub mod pipeline;
