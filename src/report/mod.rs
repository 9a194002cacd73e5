pub mod json;
pub mod junit;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::runner::TestReport;

/// Write `test-results.json` and `junit.xml` into `output_dir`
pub fn write_reports(report: &TestReport, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create report directory: {}",
            output_dir.display()
        )
    })?;

    let json_path = json::write_report(report, output_dir)?;
    println!(
        "{} JSON report saved to: {}",
        "📄".to_string().blue(),
        json_path.display().to_string().cyan()
    );

    let junit_path = junit::write_report(report, output_dir)?;
    println!(
        "{} JUnit report saved to: {}",
        "📊".to_string().blue(),
        junit_path.display().to_string().cyan()
    );

    Ok(())
}
