//! Core reconstruction logic for scheduler run analysis.
//!
//! This crate contains the fundamental types and logic for:
//! - Event parsing: splitting scheduler log lines into timestamped events
//! - Reconstruction: per-job run intervals and the core allocation timeline
//! - Latency series: loading percentile samples and scoring them against the
//!   service objective
//! - Aggregation: mean and spread of running times across repetitions

pub mod aggregate;
pub mod event;
pub mod intervals;
pub mod latency;
mod reconstruct;
pub mod timebase;
pub mod timeline;

pub use aggregate::{AggregateError, AggregateReport, MeanStd, RunTotals, aggregate};
pub use event::{EventKind, LogEvent, ParseError, parse_line};
pub use intervals::{IntervalError, IntervalTracker, JobInterval, JobIntervals};
pub use latency::{
    DEFAULT_SLO_THRESHOLD_US, LatencyError, LatencySample, SloReport, load_series, parse_series,
    read_reference_ms, slo_report, trim_to_end,
};
pub use reconstruct::{
    Reconstruction, ReconstructError, ReconstructOptions, reconstruct_log, reconstruct_reader,
};
pub use timebase::{TimeBase, round_up_to_interval};
pub use timeline::{AllocationPoint, DEFAULT_INITIAL_CORES, TimelineBuilder};
