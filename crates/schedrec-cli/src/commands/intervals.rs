//! Intervals command for per-job execution intervals of one run.

use std::fmt::Write;
use std::io;
use std::path::Path;

use anyhow::Result;
use schedrec_core::{JobIntervals, Reconstruction};
use serde::Serialize;

use super::input;
use crate::Config;

/// JSON payload of one run's intervals.
#[derive(Debug, Serialize)]
struct JsonIntervals<'a> {
    reference_ms: i64,
    end_time: i64,
    jobs: &'a JobIntervals,
}

/// Formats the human-readable interval listing.
pub fn format_table(title: &str, reconstruction: &Reconstruction) -> String {
    let mut output = String::new();

    writeln!(output, "JOB INTERVALS: {title}").unwrap();
    writeln!(output).unwrap();

    if reconstruction.intervals.is_empty() {
        writeln!(output, "(no jobs)").unwrap();
    }

    for (job, intervals) in &reconstruction.intervals {
        let total: i64 = intervals.iter().map(|interval| interval.duration).sum();
        writeln!(output, "{job}  {total} s total").unwrap();
        for interval in intervals {
            writeln!(
                output,
                "  at {:>5} s  ran {:>5} s",
                interval.start, interval.duration
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "End time: {} s", reconstruction.end_time).unwrap();
    output
}

/// Formats one run's intervals as pretty JSON.
pub fn format_json(reference_ms: i64, reconstruction: &Reconstruction) -> Result<String> {
    let payload = JsonIntervals {
        reference_ms,
        end_time: reconstruction.end_time,
        jobs: &reconstruction.intervals,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Writes one CSV row per interval, in the harness result-file shape.
pub fn write_csv<W: io::Write>(writer: W, reconstruction: &Reconstruction) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["job", "start_time", "duration"])?;

    for (job, intervals) in &reconstruction.intervals {
        for interval in intervals {
            csv_writer.write_record([
                job.as_str(),
                &interval.start.to_string(),
                &interval.duration.to_string(),
            ])?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Runs the intervals command.
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

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use schedrec_core::{AllocationPoint, JobInterval};

    fn fixture() -> Reconstruction {
        let mut intervals = JobIntervals::new();
        intervals.insert(
            "blackscholes".to_string(),
            vec![
                JobInterval {
                    start: 0,
                    duration: 420,
                },
                JobInterval {
                    start: 600,
                    duration: 300,
                },
            ],
        );
        intervals.insert(
            "dedup".to_string(),
            vec![JobInterval {
                start: 12,
                duration: 252,
            }],
        );

        Reconstruction {
            intervals,
            timeline: vec![
                AllocationPoint { time: 0, cores: 1 },
                AllocationPoint {
                    time: 1800,
                    cores: 1,
                },
            ],
            end_time: 1800,
        }
    }

    #[test]
    fn table_lists_intervals_per_job() {
        let output = format_table("rep_1", &fixture());
        assert_snapshot!(output, @r"
        JOB INTERVALS: rep_1

        blackscholes  720 s total
          at     0 s  ran   420 s
          at   600 s  ran   300 s
        dedup  252 s total
          at    12 s  ran   252 s

        End time: 1800 s
        ");
    }

    #[test]
    fn table_for_a_run_without_jobs() {
        let rec = Reconstruction {
            intervals: JobIntervals::new(),
            timeline: vec![
                AllocationPoint { time: 0, cores: 1 },
                AllocationPoint { time: 0, cores: 1 },
            ],
            end_time: 0,
        };
        let output = format_table("rep_1", &rec);
        assert_snapshot!(output, @r"
        JOB INTERVALS: rep_1

        (no jobs)

        End time: 0 s
        ");
    }

    #[test]
    fn json_carries_reference_and_intervals() {
        let output = format_json(1_640_995_200_000, &fixture()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["reference_ms"], 1_640_995_200_000_i64);
        assert_eq!(json["end_time"], 1800);
        assert_eq!(json["jobs"]["dedup"][0]["start"], 12);
        assert_eq!(json["jobs"]["blackscholes"][1]["duration"], 300);
    }

    #[test]
    fn csv_emits_one_row_per_interval() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &fixture()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "job,start_time,duration\n\
             blackscholes,0,420\n\
             blackscholes,600,300\n\
             dedup,12,252\n"
        );
    }
}
