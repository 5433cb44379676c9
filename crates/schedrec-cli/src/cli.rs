//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scheduler-run reconstruction toolkit.
///
/// Rebuilds per-job execution intervals and the memcached core-allocation
/// timeline from scheduler logs, aligned to the latency capture of the same
/// run.
#[derive(Debug, Parser)]
#[command(name = "schedrec", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconstruct per-job execution intervals from one run directory.
    Intervals {
        /// Run directory containing scheduler.log and latencies.raw.
        run_dir: PathBuf,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Output CSV (job,start_time,duration) instead of a table.
        #[arg(long, conflicts_with = "json")]
        csv: bool,

        /// Sampling interval of the latency series in seconds.
        #[arg(long)]
        interval: Option<i64>,
    },

    /// Reconstruct the core-allocation timeline from one run directory.
    Timeline {
        /// Run directory containing scheduler.log and latencies.raw.
        run_dir: PathBuf,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Output CSV (time,cores) instead of a table.
        #[arg(long, conflicts_with = "json")]
        csv: bool,

        /// Sampling interval of the latency series in seconds.
        #[arg(long)]
        interval: Option<i64>,
    },

    /// Aggregate job running times across repetition directories.
    Report {
        /// Repetition directories, each with scheduler.log and latencies.raw.
        #[arg(required = true)]
        runs: Vec<PathBuf>,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Score each run's latency series against the service objective.
        #[arg(long)]
        slo: bool,

        /// Sampling interval of the latency series in seconds.
        #[arg(long)]
        interval: Option<i64>,

        /// p95 threshold in microseconds.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Score one latency series against the service objective.
    Slo {
        /// Latency series file, comma or whitespace form.
        series: PathBuf,

        /// Drop samples recorded after this many seconds.
        #[arg(long)]
        end_time: Option<i64>,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Sampling interval of the latency series in seconds.
        #[arg(long)]
        interval: Option<i64>,

        /// p95 threshold in microseconds.
        #[arg(long)]
        threshold: Option<f64>,
    },
}
