//! Record-level anomaly detection.
//!
//! The three flags match what the dashboard renders: a rating/metascore
//! mismatch, a runtime outside the Tukey fences, and a rating that disagrees
//! with what its vote count predicts under a least-squares fit.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::stats;
use crate::data::clean::{CleanOutcome, MovieRecord};

const HIGH_RATING: f64 = 8.0;
const LOW_METASCORE: f64 = 60.0;
const RESIDUAL_SIGMAS: f64 = 2.0;

pub const KIND_DUPLICATE: &str = "duplicate";
pub const KIND_INVALID_FIELD: &str = "invalid_field";
pub const KIND_RATING_META: &str = "anomaly_rating_high_meta_low";
pub const KIND_DURATION: &str = "anomaly_duration_outlier";
pub const KIND_RATING_VOTES: &str = "anomaly_rating_votes_inconsistent";

/// A cleaned record plus its anomaly flags, as `movies_final.json` records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedRecord {
    #[serde(flatten)]
    pub record: MovieRecord,
    pub is_anomaly: bool,
    pub anomaly_rating_high_meta_low: bool,
    pub anomaly_duration_outlier: bool,
    pub anomaly_rating_votes_inconsistent: bool,
}

/// Per-category counts and offending titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub counts: IndexMap<String, usize>,
    pub titles: IndexMap<String, Vec<String>>,
}

impl AnomalyReport {
    fn record(&mut self, kind: &str, title: &str) {
        *self.counts.entry(kind.to_string()).or_insert(0) += 1;
        self.titles
            .entry(kind.to_string())
            .or_default()
            .push(title.to_string());
    }
}

/// Flag every record and fold cleaning-stage accounting into the report.
pub fn detect(outcome: &CleanOutcome) -> (Vec<FlaggedRecord>, AnomalyReport) {
    let records = &outcome.records;
    let mut report = AnomalyReport::default();

    if !outcome.duplicates.is_empty() {
        report
            .counts
            .insert(KIND_DUPLICATE.to_string(), outcome.duplicates.len());
        report
            .titles
            .insert(KIND_DUPLICATE.to_string(), outcome.duplicates.clone());
    }
    if outcome.invalid_fields > 0 {
        report
            .counts
            .insert(KIND_INVALID_FIELD.to_string(), outcome.invalid_fields);
    }

    let duration_fences = stats::box_stats(
        &records
            .iter()
            .filter_map(|r| r.duration_min.map(|d| d as f64))
            .collect::<Vec<_>>(),
    );

    let vote_pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| match (r.votes, r.rating) {
            (Some(v), Some(rating)) if v > 0 => Some(((v as f64).log10(), rating)),
            _ => None,
        })
        .collect();
    let vote_fit = stats::ols(&vote_pairs);

    let mut flagged = Vec::with_capacity(records.len());
    for record in records {
        let rating_meta = matches!(
            (record.rating, record.metascore),
            (Some(r), Some(m)) if r >= HIGH_RATING && m <= LOW_METASCORE
        );

        let duration_outlier = match (&duration_fences, record.duration_min) {
            (Some(fences), Some(d)) => {
                let d = d as f64;
                d < fences.lower || d > fences.upper
            }
            _ => false,
        };

        let rating_votes = match (&vote_fit, record.votes, record.rating) {
            (Some(fit), Some(v), Some(rating)) if v > 0 && fit.residual_std > 1e-12 => {
                let residual = rating - fit.predict((v as f64).log10());
                residual.abs() > RESIDUAL_SIGMAS * fit.residual_std
            }
            _ => false,
        };

        if rating_meta {
            report.record(KIND_RATING_META, &record.title);
        }
        if duration_outlier {
            report.record(KIND_DURATION, &record.title);
        }
        if rating_votes {
            report.record(KIND_RATING_VOTES, &record.title);
        }

        flagged.push(FlaggedRecord {
            record: record.clone(),
            is_anomaly: rating_meta || duration_outlier || rating_votes,
            anomaly_rating_high_meta_low: rating_meta,
            anomaly_duration_outlier: duration_outlier,
            anomaly_rating_votes_inconsistent: rating_votes,
        });
    }

    info!(
        flagged = flagged.iter().filter(|r| r.is_anomaly).count(),
        total = flagged.len(),
        "anomaly detection complete"
    );
    (flagged, report)
}
