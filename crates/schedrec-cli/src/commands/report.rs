//! Report command for aggregating job times across repetitions.
//!
//! This module implements `schedrec report` over N repetition directories,
//! with an optional SLO section scoring each repetition's latency series, and
//! human-readable or JSON output.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use schedrec_core::{AggregateReport, RunTotals, aggregate, load_series, slo_report, trim_to_end};
use serde::Serialize;

use super::input::{self, RunInput};
use crate::Config;

/// Service-objective scores across all repetitions.
#[derive(Debug, Serialize)]
pub struct SloSection {
    pub threshold_us: f64,
    pub runs: Vec<RunSlo>,
    pub mean_ratio: f64,
}

/// One repetition's violation count.
#[derive(Debug, Serialize)]
pub struct RunSlo {
    pub dir: String,
    pub samples: u32,
    pub violations: u32,
    pub ratio: f64,
}

/// Combined JSON payload.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    aggregate: &'a AggregateReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    slo: Option<&'a SloSection>,
}

// ========== SLO Scoring ==========

/// Scores each repetition's latency series, trimmed to its own window.
#[allow(clippy::cast_precision_loss)]
fn score_runs(inputs: &[RunInput], config: &Config) -> Result<SloSection> {
    let mut runs = Vec::with_capacity(inputs.len());
    for run in inputs {
        let path = run.dir.join(input::LATENCIES_CSV);
        let mut samples = load_series(&path, config.sample_interval_secs)
            .with_context(|| format!("failed to load latency series {}", path.display()))?;
        trim_to_end(&mut samples, run.reconstruction.end_time);

        let scored = slo_report(&samples, config.slo_threshold_us)
            .with_context(|| format!("failed to score {}", path.display()))?;
        runs.push(RunSlo {
            dir: run.dir.display().to_string(),
            samples: scored.samples,
            violations: scored.violations,
            ratio: scored.ratio,
        });
    }

    let mean_ratio = runs.iter().map(|run| run.ratio).sum::<f64>() / runs.len() as f64;
    Ok(SloSection {
        threshold_us: config.slo_threshold_us,
        runs,
        mean_ratio,
    })
}

// ========== Report Formatting ==========

/// Formats the human-readable aggregate table.
pub fn format_report(aggregate: &AggregateReport, slo: Option<&SloSection>) -> String {
    let mut output = String::new();

    let unit = if aggregate.runs == 1 { "run" } else { "runs" };
    writeln!(output, "RUN REPORT: {} {unit}", aggregate.runs).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "{:<16} {:>10} {:>10}", "JOB", "MEAN [s]", "STD [s]").unwrap();

    for (job, stats) in &aggregate.jobs {
        writeln!(output, "{job:<16} {:>10.2} {:>10.2}", stats.mean, stats.std).unwrap();
    }
    writeln!(
        output,
        "{:<16} {:>10.2} {:>10.2}",
        "total time", aggregate.total_time.mean, aggregate.total_time.std
    )
    .unwrap();

    if let Some(slo) = slo {
        writeln!(output).unwrap();
        writeln!(output, "SLO: p95 > {} µs", slo.threshold_us).unwrap();
        for run in &slo.runs {
            writeln!(
                output,
                "{}  {}/{} violations  ratio {:.3}",
                run.dir, run.violations, run.samples, run.ratio
            )
            .unwrap();
        }
        writeln!(output, "Mean ratio: {:.3}", slo.mean_ratio).unwrap();
    }

    output
}

/// Formats the aggregate (and optional SLO section) as pretty JSON.
pub fn format_json(aggregate: &AggregateReport, slo: Option<&SloSection>) -> Result<String> {
    let payload = JsonReport { aggregate, slo };
    Ok(serde_json::to_string_pretty(&payload)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(dirs: &[PathBuf], config: &Config, json: bool, slo: bool) -> Result<()> {
    let inputs: Vec<RunInput> = dirs
        .par_iter()
        .map(|dir| input::load_run(dir, config))
        .collect::<Result<_>>()?;

    let totals: Vec<RunTotals> = inputs
        .iter()
        .map(|run| RunTotals::from_reconstruction(&run.reconstruction))
        .collect();
    let report = aggregate(&totals)?;

    let slo_section = if slo {
        Some(score_runs(&inputs, config)?)
    } else {
        None
    };

    if json {
        println!("{}", format_json(&report, slo_section.as_ref())?);
    } else {
        print!("{}", format_report(&report, slo_section.as_ref()));
    }

    Ok(())
}
