//! Scheduler log line parsing.
//!
//! Every line the controller writes carries a fixed 19-character civil
//! timestamp followed by one space and a free-text description. Only five
//! descriptions drive reconstruction; everything else still contributes its
//! timestamp to the observation window.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Width of the timestamp prefix on every log line.
const TIMESTAMP_LEN: usize = 19;

/// Civil timestamp format used by the controller's logger.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const STARTED_PREFIX: &str = "Started job ";
const UNPAUSED_PREFIX: &str = "Unpaused job ";
const COMPLETED_PREFIX: &str = "Completed job ";
const PAUSED_PREFIX: &str = "Paused job ";
const CORES_PREFIX: &str = "memcached running on cpu ";

/// Errors for a single log line. Any of these is fatal for the whole file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not begin with a well-formed timestamp.
    #[error("line {line}: invalid timestamp in {text:?}")]
    Timestamp { line: usize, text: String },

    /// A core-allocation line listed no CPU identifiers.
    #[error("line {line}: empty cpu list")]
    EmptyCpuList { line: usize },
}

/// Classified description of one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    JobStarted { job: String },
    JobUnpaused { job: String },
    JobCompleted { job: String },
    JobPaused { job: String },
    CoreAllocation { cores: u32 },
    /// Informational line outside the recognized prefix table.
    Other,
}

/// One parsed log line: civil timestamp plus classified description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub time: NaiveDateTime,
    pub kind: EventKind,
}

/// Parses one raw log line. `line_number` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_number: usize) -> Result<LogEvent, ParseError> {
    let stamp = line.get(..TIMESTAMP_LEN).ok_or_else(|| ParseError::Timestamp {
        line: line_number,
        text: line.to_string(),
    })?;
    let time =
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|_| ParseError::Timestamp {
            line: line_number,
            text: stamp.to_string(),
        })?;

    // Description starts after the timestamp and one separator byte; a bare
    // timestamp line has none.
    let description = line.get(TIMESTAMP_LEN + 1..).unwrap_or("");
    let kind = classify(description, line_number)?;

    Ok(LogEvent { time, kind })
}

fn classify(description: &str, line_number: usize) -> Result<EventKind, ParseError> {
    if let Some(job) = description.strip_prefix(STARTED_PREFIX) {
        return Ok(EventKind::JobStarted {
            job: job.to_string(),
        });
    }
    if let Some(job) = description.strip_prefix(UNPAUSED_PREFIX) {
        return Ok(EventKind::JobUnpaused {
            job: job.to_string(),
        });
    }
    if let Some(job) = description.strip_prefix(COMPLETED_PREFIX) {
        return Ok(EventKind::JobCompleted {
            job: job.to_string(),
        });
    }
    if let Some(job) = description.strip_prefix(PAUSED_PREFIX) {
        return Ok(EventKind::JobPaused {
            job: job.to_string(),
        });
    }
    if let Some(list) = description.strip_prefix(CORES_PREFIX) {
        let cores = count_cpus(list);
        if cores == 0 {
            return Err(ParseError::EmptyCpuList { line: line_number });
        }
        return Ok(EventKind::CoreAllocation { cores });
    }
    Ok(EventKind::Other)
}

/// Number of CPU identifiers in a list such as `0,1` or `2 3`.
///
/// The controller joins the list with commas; tokens are counted rather than
/// derived from the string width so multi-digit identifiers stay correct.
#[must_use]
pub fn count_cpus(list: &str) -> u32 {
    let count = list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
