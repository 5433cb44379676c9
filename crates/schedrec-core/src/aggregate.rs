//! Cross-repetition aggregation of running times.
//!
//! Each repetition reduces to a per-job running time plus its observation
//! window. Aggregation lines those up across repetitions and reports mean and
//! population standard deviation per job, with the window itself as one more
//! series.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

use crate::reconstruct::Reconstruction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no runs to aggregate")]
    NoRuns,
    #[error("job {job:?} missing from run {run}")]
    MissingJob { job: String, run: usize },
}

/// Per-job running time and the observation window of one repetition.
#[derive(Debug, Clone)]
pub struct RunTotals {
    pub jobs: BTreeMap<String, i64>,
    pub end_time: i64,
}

impl RunTotals {
    /// Collapses a reconstruction to per-job running times.
    #[must_use]
    pub fn from_reconstruction(reconstruction: &Reconstruction) -> Self {
        let jobs = reconstruction
            .intervals
            .iter()
            .map(|(job, intervals)| {
                let total = intervals.iter().map(|interval| interval.duration).sum();
                (job.clone(), total)
            })
            .collect();

        Self {
            jobs,
            end_time: reconstruction.end_time,
        }
    }
}

/// Mean and population standard deviation of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    /// Computes both statistics, or `None` for an empty series.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count;

        Some(Self {
            mean,
            std: variance.sqrt(),
        })
    }
}

/// Statistics across repetitions, jobs ordered by name.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub runs: u32,
    pub jobs: BTreeMap<String, MeanStd>,
    pub total_time: MeanStd,
}

/// Aggregates run totals across repetitions.
///
/// Every job must appear in every run; a job absent from one repetition means
/// its logs disagree and the statistics would silently mix sample sizes.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(runs: &[RunTotals]) -> Result<AggregateReport, AggregateError> {
    if runs.is_empty() {
        return Err(AggregateError::NoRuns);
    }

    let names: BTreeSet<&str> = runs
        .iter()
        .flat_map(|run| run.jobs.keys().map(String::as_str))
        .collect();

    let mut jobs = BTreeMap::new();
    for name in names {
        let mut totals = Vec::with_capacity(runs.len());
        for (index, run) in runs.iter().enumerate() {
            let Some(total) = run.jobs.get(name) else {
                return Err(AggregateError::MissingJob {
                    job: name.to_string(),
                    run: index + 1,
                });
            };
            totals.push(*total as f64);
        }

        let stats = MeanStd::of(&totals).ok_or(AggregateError::NoRuns)?;
        jobs.insert(name.to_string(), stats);
    }

    let windows: Vec<f64> = runs.iter().map(|run| run.end_time as f64).collect();
    let total_time = MeanStd::of(&windows).ok_or(AggregateError::NoRuns)?;

    Ok(AggregateReport {
        runs: u32::try_from(runs.len()).unwrap_or(u32::MAX),
        jobs,
        total_time,
    })
}
