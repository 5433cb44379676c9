//! Per-job interval reconstruction.
//!
//! Folds the ordered event stream into closed `(start, duration)` intervals,
//! one list per job. Jobs move `Idle -> Running` on Started/Unpaused and
//! `Running -> Idle` on Paused/Completed; any other transition is a protocol
//! error surfaced to the caller instead of being repaired.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

/// Interval bookkeeping errors. Both indicate a log that cannot be trusted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// A Paused/Completed event arrived for a job with no open interval.
    #[error("close event for job {job:?} at t={at}s with no open interval")]
    UnmatchedClose { job: String, at: i64 },

    /// The log ended while one or more jobs were still running.
    #[error("log ended with open interval(s) for {}", .jobs.join(", "))]
    TruncatedRun { jobs: Vec<String> },
}

/// One closed run of a job, in relative seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobInterval {
    pub start: i64,
    pub duration: i64,
}

/// Closed intervals per job name, ordered by name.
///
/// Append-only while tracking; read-only to everything downstream.
pub type JobIntervals = BTreeMap<String, Vec<JobInterval>>;

/// Open/close fold state for one reconstruction pass.
#[derive(Debug, Default)]
pub struct IntervalTracker {
    open: HashMap<String, i64>,
    closed: JobIntervals,
}

impl IntervalTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an interval for `job` at `at`, superseding any stale marker.
    pub fn open(&mut self, job: &str, at: i64) {
        self.open.insert(job.to_string(), at);
    }

    /// Closes the open interval for `job`, appending it to the job's list.
    pub fn close(&mut self, job: &str, at: i64) -> Result<(), IntervalError> {
        let Some(opened_at) = self.open.remove(job) else {
            return Err(IntervalError::UnmatchedClose {
                job: job.to_string(),
                at,
            });
        };
        self.closed
            .entry(job.to_string())
            .or_default()
            .push(JobInterval {
                start: opened_at,
                duration: at - opened_at,
            });
        Ok(())
    }

    /// Consumes the tracker, yielding the closed-interval arena.
    ///
    /// Jobs still open at this point mean the monitored run never finished.
    pub fn finish(self) -> Result<JobIntervals, IntervalError> {
        if self.open.is_empty() {
            return Ok(self.closed);
        }
        let mut jobs: Vec<String> = self.open.into_keys().collect();
        jobs.sort_unstable();
        Err(IntervalError::TruncatedRun { jobs })
    }
}
