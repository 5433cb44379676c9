//! Single-pass reconstruction of one scheduler log.
//!
//! Reads the log line by line, classifies each event, and feeds the interval
//! tracker and the allocation timeline while tracking the observation end
//! time. The pass is a pure function of (file, time base, options); callers
//! may run independent repetitions concurrently.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::event::{self, EventKind, ParseError};
use crate::intervals::{IntervalError, IntervalTracker, JobIntervals};
use crate::timebase::{self, TimeBase};
use crate::timeline::{AllocationPoint, DEFAULT_INITIAL_CORES, TimelineBuilder};

/// Buffer size for `BufReader` (64KB for optimal performance on large files)
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
}

/// Options for one reconstruction pass.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructOptions {
    /// Cores assumed allocated before the first reallocation event.
    pub initial_cores: u32,

    /// Sampling interval of the latency series; when set, the end time is
    /// rounded up to the next multiple so trimmed series keep whole samples.
    pub sample_interval: Option<i64>,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            initial_cores: DEFAULT_INITIAL_CORES,
            sample_interval: None,
        }
    }
}

/// Everything recovered from one scheduler log.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Closed per-job intervals, ordered by job name.
    pub intervals: JobIntervals,

    /// Allocation step series spanning `[0, end_time]`.
    pub timeline: Vec<AllocationPoint>,

    /// Maximum relative time observed across all lines, snapped up to the
    /// sampling interval when one was supplied.
    pub end_time: i64,
}

/// Reconstructs intervals and the allocation timeline from a log file.
pub fn reconstruct_log(
    path: &Path,
    timebase: &TimeBase,
    options: ReconstructOptions,
) -> Result<Reconstruction, ReconstructError> {
    let file = File::open(path)?;
    reconstruct_reader(BufReader::with_capacity(BUFFER_SIZE, file), timebase, options)
}

/// Reconstructs from any line source; see [`reconstruct_log`].
pub fn reconstruct_reader<R: BufRead>(
    reader: R,
    timebase: &TimeBase,
    options: ReconstructOptions,
) -> Result<Reconstruction, ReconstructError> {
    let mut tracker = IntervalTracker::new();
    let mut timeline = TimelineBuilder::new(options.initial_cores);
    let mut end_time = 0i64;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let event = event::parse_line(&line, index + 1)?;

        // Every line anchors the window, recognized or not.
        let rel = timebase.relative_secs(event.time);
        end_time = end_time.max(rel);

        match event.kind {
            EventKind::JobStarted { job } | EventKind::JobUnpaused { job } => {
                tracker.open(&job, rel);
            }
            EventKind::JobCompleted { job } | EventKind::JobPaused { job } => {
                tracker.close(&job, rel)?;
            }
            EventKind::CoreAllocation { cores } => timeline.record(rel, cores),
            EventKind::Other => {}
        }
    }

    let intervals = tracker.finish()?;
    if let Some(interval) = options.sample_interval {
        end_time = timebase::round_up_to_interval(end_time, interval);
    }

    tracing::debug!(jobs = intervals.len(), end_time, "scheduler log reconstructed");

    Ok(Reconstruction {
        intervals,
        timeline: timeline.finish(end_time),
        end_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::JobInterval;
    use crate::timeline::AllocationPoint;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Epoch milliseconds of 2022-01-01 00:00:00 UTC.
    const REFERENCE_MS: i64 = 1_640_995_200_000;

    fn base() -> TimeBase {
        TimeBase::utc(REFERENCE_MS)
    }

    fn reconstruct(lines: &[&str]) -> Result<Reconstruction, ReconstructError> {
        reconstruct_reader(
            lines.join("\n").as_bytes(),
            &base(),
            ReconstructOptions::default(),
        )
    }

    fn point(time: i64, cores: u32) -> AllocationPoint {
        AllocationPoint { time, cores }
    }

    #[test]
    fn started_completed_pair_yields_one_interval() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:10 Completed job dedup",
        ])
        .unwrap();

        assert_eq!(
            rec.intervals["dedup"],
            vec![JobInterval {
                start: 0,
                duration: 10
            }]
        );
        assert_eq!(rec.end_time, 10);
    }

    #[test]
    fn pause_cycle_splits_into_two_intervals() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job ferret",
            "2022/01/01 00:00:20 Paused job ferret",
            "2022/01/01 00:00:30 Unpaused job ferret",
            "2022/01/01 00:00:50 Completed job ferret",
        ])
        .unwrap();

        let durations: Vec<i64> = rec.intervals["ferret"].iter().map(|iv| iv.duration).collect();
        assert_eq!(durations, vec![20, 20]);
        // Total running time is the full span minus the pause gap.
        assert_eq!(durations.iter().sum::<i64>(), 50 - 10);
    }

    #[test]
    fn durations_never_exceed_the_window() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:05 Started job canneal",
            "2022/01/01 00:00:12 Completed job dedup",
            "2022/01/01 00:00:30 Completed job canneal",
        ])
        .unwrap();

        for intervals in rec.intervals.values() {
            let total: i64 = intervals.iter().map(|iv| iv.duration).sum();
            assert!(total <= rec.end_time);
            assert!(intervals.iter().all(|iv| iv.duration >= 0));
        }
    }

    #[test]
    fn core_changes_produce_step_edges() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:05 memcached running on cpu 0,1",
            "2022/01/01 00:00:15 memcached running on cpu 0",
            "2022/01/01 00:00:20 Completed job dedup",
        ])
        .unwrap();

        assert_eq!(
            rec.timeline,
            vec![
                point(0, 1),
                point(5, 1),
                point(5, 2),
                point(15, 2),
                point(15, 1),
                point(20, 1),
            ]
        );
    }

    #[test]
    fn no_core_changes_gives_flat_two_point_series() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:10 Completed job dedup",
        ])
        .unwrap();

        assert_eq!(rec.timeline, vec![point(0, 1), point(10, 1)]);
    }

    #[test]
    fn unrecognized_lines_still_advance_the_window() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:10 Completed job dedup",
            "2022/01/01 00:00:15 Removed job dedup",
            "2022/01/01 00:00:17 Finished scheduling all jobs",
        ])
        .unwrap();

        assert_eq!(rec.end_time, 17);
        assert_eq!(rec.timeline.last(), Some(&point(17, 1)));
    }

    #[test]
    fn end_time_rounds_up_to_sample_interval() {
        let options = ReconstructOptions {
            sample_interval: Some(20),
            ..Default::default()
        };
        let lines = [
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:10 Completed job dedup",
        ];
        let rec = reconstruct_reader(lines.join("\n").as_bytes(), &base(), options).unwrap();

        assert_eq!(rec.end_time, 20);
        assert_eq!(rec.timeline.last(), Some(&point(20, 1)));
    }

    #[test]
    fn aligned_end_time_is_unchanged_by_rounding() {
        let options = ReconstructOptions {
            sample_interval: Some(20),
            ..Default::default()
        };
        let lines = [
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:01:00 Completed job dedup",
        ];
        let rec = reconstruct_reader(lines.join("\n").as_bytes(), &base(), options).unwrap();

        assert_eq!(rec.end_time, 60);
    }

    #[test]
    fn unmatched_close_aborts_reconstruction() {
        let err = reconstruct(&["2022/01/01 00:00:10 Paused job dedup"]).unwrap_err();
        assert!(matches!(
            err,
            ReconstructError::Interval(IntervalError::UnmatchedClose { .. })
        ));
    }

    #[test]
    fn truncated_run_aborts_reconstruction() {
        let err = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:05 Started job canneal",
            "2022/01/01 00:00:12 Completed job dedup",
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ReconstructError::Interval(IntervalError::TruncatedRun { .. })
        ));
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "garbage line",
        ])
        .unwrap_err();

        match err {
            ReconstructError::Parse(ParseError::Timestamp { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn interleaved_jobs_reconstruct_independently() {
        let rec = reconstruct(&[
            "2022/01/01 00:00:00 Started job dedup",
            "2022/01/01 00:00:02 Started job blackscholes",
            "2022/01/01 00:00:05 Paused job blackscholes",
            "2022/01/01 00:00:09 Completed job dedup",
            "2022/01/01 00:00:11 Unpaused job blackscholes",
            "2022/01/01 00:00:20 Completed job blackscholes",
        ])
        .unwrap();

        assert_eq!(
            rec.intervals["dedup"],
            vec![JobInterval {
                start: 0,
                duration: 9
            }]
        );
        assert_eq!(
            rec.intervals["blackscholes"],
            vec![
                JobInterval {
                    start: 2,
                    duration: 3
                },
                JobInterval {
                    start: 11,
                    duration: 9
                },
            ]
        );
    }

    #[test]
    fn empty_log_reconstructs_to_the_seed() {
        let rec = reconstruct(&[]).unwrap();
        assert!(rec.intervals.is_empty());
        assert_eq!(rec.end_time, 0);
        assert_eq!(rec.timeline, vec![point(0, 1), point(0, 1)]);
    }

    #[test]
    fn reconstruct_log_reads_from_a_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2022/01/01 00:00:00 Started job dedup").unwrap();
        writeln!(file, "2022/01/01 00:00:10 Completed job dedup").unwrap();

        let rec = reconstruct_log(file.path(), &base(), ReconstructOptions::default()).unwrap();
        assert_eq!(rec.end_time, 10);
        assert_eq!(rec.intervals.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = reconstruct_log(
            Path::new("/nonexistent/scheduler.log"),
            &base(),
            ReconstructOptions::default(),
        );
        assert!(matches!(result, Err(ReconstructError::Io(_))));
    }
}
