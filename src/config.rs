//! Runtime configuration utilities for imdb-pipeline.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Contact email advertised in the scraper user agent.
    pub contact_email: String,
    /// Base URL of the IMDB chart to scrape.
    pub chart_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Folder receiving the JSON/PNG artifacts.
    pub output_dir: PathBuf,
    /// Root of the React dashboard project receiving copies of movies_final.json.
    pub dashboard_dir: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let contact_email =
            env::var("IMDB_CONTACT_EMAIL").unwrap_or_else(|_| "research@example.com".to_string());
        let chart_url = env::var("IMDB_CHART_URL")
            .unwrap_or_else(|_| "https://www.imdb.com/chart/top/".to_string());
        let request_timeout_secs = env::var("IMDB_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let output_dir = env::var("IMDB_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let dashboard_dir = env::var("IMDB_DASHBOARD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./imdb-dashboard"));

        std::fs::create_dir_all(&output_dir).context("creating output dir")?;

        Ok(Self {
            contact_email,
            chart_url,
            request_timeout_secs,
            output_dir,
            dashboard_dir,
        })
    }

    /// Convenience helper for derived artifact path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.output_dir.join(path)
    }

    /// Convenience helper for paths inside the dashboard project.
    pub fn join_dashboard<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.dashboard_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_helpers_compose_paths() {
        let settings = Settings {
            contact_email: "a@b.c".into(),
            chart_url: "https://example.com/chart".into(),
            request_timeout_secs: 5,
            output_dir: PathBuf::from("/tmp/out"),
            dashboard_dir: PathBuf::from("/tmp/dash"),
        };
        assert_eq!(
            settings.join_output("movies_final.json"),
            PathBuf::from("/tmp/out/movies_final.json")
        );
        assert_eq!(
            settings.join_dashboard("public"),
            PathBuf::from("/tmp/dash/public")
        );
    }
}
