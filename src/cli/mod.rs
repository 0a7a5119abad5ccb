//! Command-line interface wiring for imdb-pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::dashboard;
use crate::pipeline::{self, RunOptions};

pub mod process;
pub mod report;
pub mod run;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Scrape, clean and analyze IMDB chart data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Process(args) => process::run(args, settings).await,
            Commands::Run(args) => run::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Full pipeline plus dashboard sync and final-artifact excerpt.
    Process(process::Args),
    /// Pipeline only; no dashboard copies.
    Run(run::Args),
}

/// The shared sequence behind both sub-commands: run the pipeline, then
/// report; `sync_dashboard` selects the extra copy/excerpt post-steps.
pub(crate) async fn execute(
    opts: RunOptions,
    settings: &Settings,
    sync_dashboard: bool,
) -> Result<()> {
    println!(
        "Starting pipeline: limit={}, fast={}, threads={}",
        opts.limit, opts.fast, opts.threads
    );
    let output = pipeline::run_pipeline(&opts, settings).await?;

    if sync_dashboard {
        match dashboard::sync(settings) {
            Ok(copies) => {
                for path in &copies {
                    println!("Copied {} -> {}", pipeline::FINAL_JSON, path.display());
                }
            }
            Err(error) => warn!(%error, "dashboard sync failed; root artifacts remain valid"),
        }
    }

    report::print_summary(&output.summary)?;
    report::print_files_written(sync_dashboard);

    if sync_dashboard {
        match report::final_excerpt(&pipeline::final_json_path(settings)) {
            Ok(excerpt) => print!("{excerpt}"),
            Err(error) => debug!(%error, "skipping final artifact excerpt"),
        }
    }
    Ok(())
}
