//! Console reporting shared by both sub-commands.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::pipeline::{self, Summary};

/// Print the run summary as pretty JSON.
pub fn print_summary(summary: &Summary) -> Result<()> {
    println!("\nSummary:");
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Print the fixed list of artifacts a run produces.
pub fn print_files_written(with_dashboard: bool) {
    println!("\nFiles written:");
    for name in pipeline::artifact_names(with_dashboard) {
        println!(" - {name}");
    }
}

/// Re-read `movies_final.json` and format its headline summary fields.
///
/// Any failure (missing file, malformed JSON, missing keys) is returned as an
/// error for the caller to log and ignore; nothing is partially printed.
pub fn final_excerpt(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let doc: serde_json::Value =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    let summary = doc
        .get("summary")
        .ok_or_else(|| anyhow!("no summary key in {}", path.display()))?;
    let n_records = summary
        .get("n_records")
        .ok_or_else(|| anyhow!("no n_records in summary"))?;
    let anomalies_counts = summary
        .get("anomalies_counts")
        .ok_or_else(|| anyhow!("no anomalies_counts in summary"))?;

    let mut out = String::new();
    writeln!(out, "\n{} summary:", pipeline::FINAL_JSON)?;
    writeln!(out, "n_records: {n_records}")?;
    writeln!(out, "anomalies_counts: {anomalies_counts}")?;
    Ok(out)
}
