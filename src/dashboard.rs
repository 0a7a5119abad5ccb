//! Best-effort sync of `movies_final.json` into the dashboard project.
//!
//! The React app reads the copy under `public/`; a second copy lives under
//! `src/` for historical reasons. Failure here never fails the run; callers
//! log the error and keep going, since the root artifacts are already valid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Settings;
use crate::pipeline;

/// Copy the root `movies_final.json` into the dashboard's `src/` and
/// `public/` folders, creating them as needed. A missing source file is a
/// clean skip, returning no copies.
pub fn sync(settings: &Settings) -> Result<Vec<PathBuf>> {
    let source = pipeline::final_json_path(settings);
    if !source.exists() {
        info!(source = %source.display(), "no final artifact to sync");
        return Ok(Vec::new());
    }

    let mut copies = Vec::new();
    for subdir in ["src", "public"] {
        let dest_dir = settings.join_dashboard(subdir);
        std::fs::create_dir_all(&dest_dir)
            .with_context(|| format!("create {}", dest_dir.display()))?;
        let dest = dest_dir.join(pipeline::FINAL_JSON);
        std::fs::copy(&source, &dest)
            .with_context(|| format!("copy {} -> {}", source.display(), dest.display()))?;
        info!(dest = %dest.display(), "synced final artifact");
        copies.push(dest);
    }
    Ok(copies)
}
