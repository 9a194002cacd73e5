use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::TestReport;

pub const FILE_NAME: &str = "test-results.json";

/// Write the run as pretty-printed JSON; returns the file path
pub fn write_report(report: &TestReport, output_dir: &Path) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;
    let path = output_dir.join(FILE_NAME);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
