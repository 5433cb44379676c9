//! Core-allocation step function assembly.
//!
//! Each reallocation event contributes two points at the same instant: the
//! core count just before the change and the count just after, so the series
//! renders and resamples as a proper step function.

use serde::Serialize;

/// Cores assumed allocated to the service before any reallocation event.
pub const DEFAULT_INITIAL_CORES: u32 = 1;

/// One point of the allocation step series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationPoint {
    pub time: i64,
    pub cores: u32,
}

/// Accumulates allocation points over one pass; [`TimelineBuilder::finish`]
/// extends the series to the observation end.
#[derive(Debug)]
pub struct TimelineBuilder {
    points: Vec<AllocationPoint>,
    current: u32,
}

impl TimelineBuilder {
    /// Starts the series with the seed point `(0, initial_cores)`.
    #[must_use]
    pub fn new(initial_cores: u32) -> Self {
        Self {
            points: vec![AllocationPoint {
                time: 0,
                cores: initial_cores,
            }],
            current: initial_cores,
        }
    }

    /// Records a reallocation to `cores` at `time` as a step edge.
    pub fn record(&mut self, time: i64, cores: u32) {
        self.points.push(AllocationPoint {
            time,
            cores: self.current,
        });
        self.points.push(AllocationPoint { time, cores });
        self.current = cores;
    }

    /// The core count after the most recent reallocation.
    #[must_use]
    pub const fn current_cores(&self) -> u32 {
        self.current
    }

    /// Closes the series with a final point at the observation end.
    #[must_use]
    pub fn finish(mut self, end_time: i64) -> Vec<AllocationPoint> {
        self.points.push(AllocationPoint {
            time: end_time,
            cores: self.current,
        });
        self.points
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CORES)
    }
}
