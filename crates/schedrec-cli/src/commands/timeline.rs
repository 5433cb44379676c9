//! Timeline command for the core-allocation step series of one run.

use std::fmt::Write;
use std::io;
use std::path::Path;

use anyhow::Result;
use schedrec_core::{AllocationPoint, Reconstruction};
use serde::Serialize;

use super::input;
use crate::Config;

/// JSON payload of one run's allocation series.
#[derive(Debug, Serialize)]
struct JsonTimeline<'a> {
    reference_ms: i64,
    end_time: i64,
    points: &'a [AllocationPoint],
}

/// Collapses the step points into display segments.
///
/// The series doubles points at each change; a segment is any stretch where
/// time actually advances, labeled with the cores held over it.
fn segments(points: &[AllocationPoint]) -> Vec<(i64, i64, u32)> {
    points
        .windows(2)
        .filter(|pair| pair[0].time < pair[1].time)
        .map(|pair| (pair[0].time, pair[1].time, pair[0].cores))
        .collect()
}

/// Formats the human-readable allocation listing.
pub fn format_table(title: &str, reconstruction: &Reconstruction) -> String {
    let mut output = String::new();

    writeln!(output, "CORE ALLOCATION: {title}").unwrap();
    writeln!(output).unwrap();

    let segments = segments(&reconstruction.timeline);
    if segments.is_empty() {
        writeln!(output, "(no samples)").unwrap();
    }

    for (from, to, cores) in segments {
        let unit = if cores == 1 { "core" } else { "cores" };
        writeln!(output, "{from:>6} s  to {to:>6} s    {cores} {unit}").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "End time: {} s", reconstruction.end_time).unwrap();
    output
}

/// Formats one run's allocation series as pretty JSON.
pub fn format_json(reference_ms: i64, reconstruction: &Reconstruction) -> Result<String> {
    let payload = JsonTimeline {
        reference_ms,
        end_time: reconstruction.end_time,
        points: &reconstruction.timeline,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Writes the full step series, one CSV row per point.
///
/// The doubled change points are kept: they are what makes the series plot as
/// steps rather than ramps.
pub fn write_csv<W: io::Write>(writer: W, reconstruction: &Reconstruction) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["time", "cores"])?;

    for point in &reconstruction.timeline {
        csv_writer.write_record([point.time.to_string(), point.cores.to_string()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Runs the timeline command.
pub fn run(run_dir: &Path, config: &Config, json: bool, csv: bool) -> Result<()> {
    let run = input::load_run(run_dir, config)?;

    if json {
        println!("{}", format_json(run.reference_ms, &run.reconstruction)?);
    } else if csv {
        write_csv(io::stdout(), &run.reconstruction)?;
    } else {
        let title = run.dir.display().to_string();
        print!("{}", format_table(&title, &run.reconstruction));
    }

    Ok(())
}
