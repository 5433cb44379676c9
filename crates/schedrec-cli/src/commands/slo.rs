//! SLO command for scoring one latency series against the p95 threshold.

use std::path::Path;

use anyhow::{Context, Result};
use schedrec_core::{SloReport, load_series, slo_report, trim_to_end};

use crate::Config;

/// Formats the one-line human-readable score.
pub fn format_line(report: &SloReport) -> String {
    format!(
        "SLO: {} of {} samples above {} µs (ratio {:.3})\n",
        report.violations, report.samples, report.threshold_us, report.ratio
    )
}

/// Runs the slo command.
pub fn run(series: &Path, config: &Config, end_time: Option<i64>, json: bool) -> Result<()> {
    let mut samples = load_series(series, config.sample_interval_secs)
        .with_context(|| format!("failed to load latency series {}", series.display()))?;
    if let Some(end_time) = end_time {
        trim_to_end(&mut samples, end_time);
    }

    let report = slo_report(&samples, config.slo_threshold_us)
        .with_context(|| format!("failed to score {}", series.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_line(&report));
    }

    Ok(())
}
