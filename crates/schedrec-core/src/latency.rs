//! Latency series loading and service-objective accounting.
//!
//! The load generator leaves two files per repetition: a raw transcript whose
//! `Timestamp start:` line anchors the time base, and a sampled series of
//! percentile latencies. The series comes in two shapes depending on the
//! generator version, comma-separated with a header row or whitespace-aligned
//! columns. Both carry a `p95` column and are sampled at a fixed cadence, so
//! sample N lands at `N * interval` seconds after the reference instant.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// p95 latency above this many microseconds violates the service objective.
pub const DEFAULT_SLO_THRESHOLD_US: f64 = 2000.0;

/// Prefix of the transcript line carrying the epoch-millisecond start.
const REFERENCE_PREFIX: &str = "Timestamp start: ";

#[derive(Debug, Error)]
pub enum LatencyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no 'Timestamp start:' line in raw latency file")]
    MissingReferenceTime,
    #[error("unreadable reference timestamp: {text:?}")]
    BadReferenceTime { text: String },
    #[error("latency series has no p95 column")]
    MissingP95Column,
    #[error("unreadable latency sample on line {line}: {text:?}")]
    BadSample { line: usize, text: String },
    #[error("latency series has no samples")]
    EmptySeries,
}

/// One percentile sample, `time` seconds after the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySample {
    pub time: i64,
    pub p95: f64,
    pub qps: Option<f64>,
}

/// Service-objective accounting over one latency series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SloReport {
    pub threshold_us: f64,
    pub samples: u32,
    pub violations: u32,
    pub ratio: f64,
}

/// Extracts the epoch-millisecond reference from a raw transcript.
///
/// The generator repeats its banner when it reconnects, so the last
/// `Timestamp start:` line wins.
pub fn read_reference_ms(path: &Path) -> Result<i64, LatencyError> {
    let file = File::open(path)?;
    let mut reference = None;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix(REFERENCE_PREFIX) {
            let text = rest.trim();
            let parsed = text.parse::<i64>().map_err(|_| LatencyError::BadReferenceTime {
                text: text.to_string(),
            })?;
            reference = Some(parsed);
        }
    }

    reference.ok_or(LatencyError::MissingReferenceTime)
}

/// Loads a latency series, assigning sample times `sample_interval` seconds
/// apart starting at `sample_interval`.
pub fn load_series(path: &Path, sample_interval: i64) -> Result<Vec<LatencySample>, LatencyError> {
    let content = fs::read_to_string(path)?;
    parse_series(&content, sample_interval)
}

/// Parses a latency series from either supported shape; see [`load_series`].
pub fn parse_series(content: &str, sample_interval: i64) -> Result<Vec<LatencySample>, LatencyError> {
    let first_line = content.lines().find(|line| !line.trim().is_empty());
    match first_line {
        Some(line) if line.contains(',') => parse_delimited(content, sample_interval),
        Some(_) => parse_columns(content, sample_interval),
        None => Err(LatencyError::MissingP95Column),
    }
}

/// Comma-separated series with a header row naming `p95` and `QPS`.
fn parse_delimited(content: &str, sample_interval: i64) -> Result<Vec<LatencySample>, LatencyError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();
    let p95_index = headers
        .iter()
        .position(|name| name.trim() == "p95")
        .ok_or(LatencyError::MissingP95Column)?;
    let qps_index = headers.iter().position(|name| name.trim() == "QPS");

    let mut samples = Vec::new();
    let mut time = 0i64;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Header occupies line one.
        let line = index + 2;
        time += sample_interval;

        let p95 = parse_value(record.get(p95_index), line)?;
        let qps = match qps_index {
            Some(qps_index) => Some(parse_value(record.get(qps_index), line)?),
            None => None,
        };
        samples.push(LatencySample { time, p95, qps });
    }

    Ok(samples)
}

/// Whitespace-aligned series with a header row naming `p95` and `QPS`.
fn parse_columns(content: &str, sample_interval: i64) -> Result<Vec<LatencySample>, LatencyError> {
    let mut rows = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = rows.next() else {
        return Err(LatencyError::MissingP95Column);
    };
    let columns: Vec<&str> = header.split_whitespace().collect();
    let p95_index = columns
        .iter()
        .position(|name| *name == "p95")
        .ok_or(LatencyError::MissingP95Column)?;
    let qps_index = columns.iter().position(|name| *name == "QPS");

    let mut samples = Vec::new();
    let mut time = 0i64;
    for (index, row) in rows {
        let line = index + 1;
        time += sample_interval;

        let fields: Vec<&str> = row.split_whitespace().collect();
        let p95 = parse_value(fields.get(p95_index).copied(), line)?;
        let qps = match qps_index {
            Some(qps_index) => Some(parse_value(fields.get(qps_index).copied(), line)?),
            None => None,
        };
        samples.push(LatencySample { time, p95, qps });
    }

    Ok(samples)
}

fn parse_value(field: Option<&str>, line: usize) -> Result<f64, LatencyError> {
    let text = field.unwrap_or("").trim();
    text.parse::<f64>().map_err(|_| LatencyError::BadSample {
        line,
        text: text.to_string(),
    })
}

/// Drops samples past the observation window.
pub fn trim_to_end(samples: &mut Vec<LatencySample>, end_time: i64) {
    samples.retain(|sample| sample.time <= end_time);
}

/// Counts samples whose p95 exceeds `threshold_us`.
#[allow(clippy::cast_precision_loss)]
pub fn slo_report(samples: &[LatencySample], threshold_us: f64) -> Result<SloReport, LatencyError> {
    if samples.is_empty() {
        return Err(LatencyError::EmptySeries);
    }

    let violations = samples.iter().filter(|sample| sample.p95 > threshold_us).count();
    Ok(SloReport {
        threshold_us,
        samples: u32::try_from(samples.len()).unwrap_or(u32::MAX),
        violations: u32::try_from(violations).unwrap_or(u32::MAX),
        ratio: violations as f64 / samples.len() as f64,
    })
}
