//! Pipeline orchestration: scrape -> clean -> detect -> analyze -> export.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::analysis::anomaly::{self, AnomalyReport, FlaggedRecord};
use crate::analysis::charts::{self, ChartsPayload};
use crate::analysis::stats::{self, Describe};
use crate::config::Settings;
use crate::data::{clean, scrape};

pub const CLEANED_JSON: &str = "movies_cleaned.json";
pub const CHARTS_JSON: &str = "movies_charts.json";
pub const ANALYSIS_JSON: &str = "movies_analysis.json";
pub const FINAL_JSON: &str = "movies_final.json";
pub const BOXPLOT_RATING_PNG: &str = "boxplot_rating.png";
pub const BOXPLOT_METASCORE_PNG: &str = "boxplot_metascore.png";

/// Run configuration derived from CLI flags, immutable for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub limit: usize,
    pub fast: bool,
    pub threads: usize,
}

/// Headline figures for the run, the `summary` key of `movies_final.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub n_records: usize,
    pub anomalies_counts: IndexMap<String, usize>,
    pub mean_rating: Option<f64>,
    pub mean_metascore: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// What the pipeline hands back to the CLI layer.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<FlaggedRecord>,
    pub report: AnomalyReport,
    pub summary: Summary,
}

/// Payload written to `movies_analysis.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub describe: IndexMap<String, Option<Describe>>,
    pub correlation_rating_metascore: Option<f64>,
    pub genre_counts: IndexMap<String, usize>,
    pub anomalies: AnomalyReport,
}

/// Full pipeline: scrape the chart, clean, flag anomalies, export artifacts.
#[instrument(skip(settings))]
pub async fn run_pipeline(opts: &RunOptions, settings: &Settings) -> Result<PipelineOutput> {
    let raw = scrape::scrape_movies(opts.limit, opts.fast, opts.threads, settings).await?;
    let outcome = clean::clean(raw);
    finish(outcome, settings)
}

/// Everything after ingestion; pure filesystem, reused by tests with canned data.
pub fn finish(outcome: clean::CleanOutcome, settings: &Settings) -> Result<PipelineOutput> {
    let (records, report) = anomaly::detect(&outcome);
    let charts_payload = charts::build(&outcome.records);
    let analysis = build_analysis(&outcome.records, report.clone());
    let summary = build_summary(&records, &report);

    export(settings, &outcome.records, &charts_payload, &analysis, &records, &summary)?;
    Ok(PipelineOutput {
        records,
        report,
        summary,
    })
}

fn build_summary(records: &[FlaggedRecord], report: &AnomalyReport) -> Summary {
    let ratings: Vec<f64> = records.iter().filter_map(|r| r.record.rating).collect();
    let metascores: Vec<f64> = records.iter().filter_map(|r| r.record.metascore).collect();
    Summary {
        n_records: records.len(),
        anomalies_counts: report.counts.clone(),
        mean_rating: stats::describe(&ratings).map(|d| d.mean),
        mean_metascore: stats::describe(&metascores).map(|d| d.mean),
        generated_at: Utc::now(),
    }
}

fn build_analysis(records: &[clean::MovieRecord], report: AnomalyReport) -> AnalysisPayload {
    let column = |f: &dyn Fn(&clean::MovieRecord) -> Option<f64>| -> Vec<f64> {
        records.iter().filter_map(f).collect()
    };
    let mut describe = IndexMap::new();
    describe.insert("rating".to_string(), stats::describe(&column(&|r| r.rating)));
    describe.insert(
        "metascore".to_string(),
        stats::describe(&column(&|r| r.metascore)),
    );
    describe.insert(
        "duration_min".to_string(),
        stats::describe(&column(&|r| r.duration_min.map(|d| d as f64))),
    );
    describe.insert(
        "votes".to_string(),
        stats::describe(&column(&|r| r.votes.map(|v| v as f64))),
    );

    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| match (r.rating, r.metascore) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .collect();

    let mut genre_counts = IndexMap::new();
    for record in records {
        for genre in &record.genres {
            *genre_counts.entry(genre.clone()).or_insert(0) += 1;
        }
    }
    genre_counts.sort_by(|_, a, _, b| b.cmp(a));

    AnalysisPayload {
        describe,
        correlation_rating_metascore: stats::pearson(&pairs),
        genre_counts,
        anomalies: report,
    }
}

fn export(
    settings: &Settings,
    cleaned: &[clean::MovieRecord],
    charts_payload: &ChartsPayload,
    analysis: &AnalysisPayload,
    records: &[FlaggedRecord],
    summary: &Summary,
) -> Result<()> {
    write_json(settings.join_output(CLEANED_JSON), cleaned)?;
    write_json(settings.join_output(CHARTS_JSON), charts_payload)?;
    write_json(settings.join_output(ANALYSIS_JSON), analysis)?;
    write_json(
        settings.join_output(FINAL_JSON),
        &serde_json::json!({ "records": records, "summary": summary }),
    )?;

    if let Some(stats) = &charts_payload.boxplot_rating {
        charts::render_boxplot(stats, &settings.join_output(BOXPLOT_RATING_PNG))?;
    }
    if let Some(stats) = &charts_payload.boxplot_metascore {
        charts::render_boxplot(stats, &settings.join_output(BOXPLOT_METASCORE_PNG))?;
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("serialise {}", path.display()))?;
    info!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Artifact names for console reporting, in the order the original printed them.
pub fn artifact_names(with_dashboard: bool) -> Vec<String> {
    let mut names = vec![
        CLEANED_JSON.to_string(),
        CHARTS_JSON.to_string(),
        ANALYSIS_JSON.to_string(),
        FINAL_JSON.to_string(),
    ];
    if with_dashboard {
        names.push(format!("imdb-dashboard/src/{FINAL_JSON}"));
        names.push(format!("imdb-dashboard/public/{FINAL_JSON}"));
    }
    names.push(format!("{BOXPLOT_RATING_PNG}, {BOXPLOT_METASCORE_PNG}"));
    names
}

/// Resolve the root `movies_final.json` path for a settings instance.
pub fn final_json_path(settings: &Settings) -> PathBuf {
    settings.join_output(FINAL_JSON)
}
