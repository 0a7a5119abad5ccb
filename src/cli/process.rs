//! CLI entry-point for the full pipeline with dashboard sync.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::config::Settings;
use crate::pipeline::RunOptions;

/// Args for the `process` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Number of chart entries to scrape.
    #[arg(long, default_value_t = 100)]
    pub limit: usize,
    /// Fetch title details concurrently instead of one at a time.
    #[arg(long)]
    pub fast: bool,
    /// Worker count for fast mode.
    #[arg(long, default_value_t = 8)]
    pub threads: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let opts = RunOptions {
        limit: args.limit,
        fast: args.fast,
        threads: args.threads,
    };
    super::execute(opts, &settings, true).await
}
