//! Shared loading of run directories.
//!
//! A run directory is the fixed layout the measurement harness leaves behind:
//! the scheduler's event log next to the load generator's raw transcript and
//! sampled latency series.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::FixedOffset;
use schedrec_core::{
    ReconstructOptions, Reconstruction, TimeBase, read_reference_ms, reconstruct_log,
};

use crate::Config;

/// File the scheduler writes its event log to.
pub const SCHEDULER_LOG: &str = "scheduler.log";

/// Raw load generator transcript, carries the reference timestamp.
pub const LATENCIES_RAW: &str = "latencies.raw";

/// Sampled latency series scored by the report's SLO section.
pub const LATENCIES_CSV: &str = "latencies.csv";

/// One reconstructed run directory.
#[derive(Debug)]
pub struct RunInput {
    pub dir: PathBuf,
    pub reference_ms: i64,
    pub reconstruction: Reconstruction,
}

/// Reads the reference timestamp and reconstructs one run directory.
pub fn load_run(dir: &Path, config: &Config) -> Result<RunInput> {
    let raw_path = dir.join(LATENCIES_RAW);
    let reference_ms = read_reference_ms(&raw_path)
        .with_context(|| format!("failed to read reference time from {}", raw_path.display()))?;

    let offset = FixedOffset::east_opt(config.utc_offset_secs)
        .context("utc_offset_secs is out of range")?;
    let timebase = TimeBase::new(reference_ms, offset);

    let log_path = dir.join(SCHEDULER_LOG);
    let options = ReconstructOptions {
        sample_interval: Some(config.sample_interval_secs),
        ..Default::default()
    };
    let reconstruction = reconstruct_log(&log_path, &timebase, options)
        .with_context(|| format!("failed to reconstruct {}", log_path.display()))?;

    Ok(RunInput {
        dir: dir.to_path_buf(),
        reference_ms,
        reconstruction,
    })
}
