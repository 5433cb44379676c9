//! Conversion of civil log timestamps into the shared relative time base.
//!
//! The scheduler log and the latency capture live on different clocks: the log
//! carries zone-less civil timestamps while the capture records an absolute
//! epoch-millisecond start. A [`TimeBase`] holds that reference instant plus
//! the fixed UTC offset the log was written in, so the conversion never touches
//! process-wide time-zone state.

use chrono::{FixedOffset, NaiveDateTime};

/// Reference instant and log offset shared by one repetition's files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    reference_ms: i64,
    offset: FixedOffset,
}

impl TimeBase {
    /// Creates a time base from an epoch-millisecond reference and the fixed
    /// offset the log's civil timestamps are expressed in.
    #[must_use]
    pub const fn new(reference_ms: i64, offset: FixedOffset) -> Self {
        Self {
            reference_ms,
            offset,
        }
    }

    /// Time base for logs authored in UTC, the controller's configuration.
    #[must_use]
    pub fn utc(reference_ms: i64) -> Self {
        Self::new(reference_ms, FixedOffset::east_opt(0).unwrap())
    }

    #[must_use]
    pub const fn reference_ms(&self) -> i64 {
        self.reference_ms
    }

    /// Whole seconds between a civil log timestamp and the reference instant,
    /// truncated toward zero.
    #[must_use]
    pub fn relative_secs(&self, local: NaiveDateTime) -> i64 {
        let epoch_secs = local.and_utc().timestamp() - i64::from(self.offset.local_minus_utc());
        (epoch_secs * 1000 - self.reference_ms) / 1000
    }
}

/// Rounds `end_time` up to the next multiple of `interval`.
///
/// Values already on a boundary are unchanged; non-positive intervals leave
/// the end time as-is.
#[must_use]
pub const fn round_up_to_interval(end_time: i64, interval: i64) -> i64 {
    if interval <= 0 {
        return end_time;
    }
    let remainder = end_time.rem_euclid(interval);
    if remainder == 0 {
        end_time
    } else {
        end_time + (interval - remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Epoch milliseconds of 2022-01-01 00:00:00 UTC.
    const JAN_2022_MS: i64 = 1_640_995_200_000;

    fn civil(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn relative_secs_against_aligned_reference() {
        let base = TimeBase::utc(JAN_2022_MS);
        assert_eq!(base.relative_secs(civil(0, 0, 0)), 0);
        assert_eq!(base.relative_secs(civil(0, 0, 10)), 10);
        assert_eq!(base.relative_secs(civil(0, 30, 0)), 1800);
    }

    #[test]
    fn relative_secs_truncates_toward_zero() {
        // Reference half a second after the epoch-aligned instant.
        let base = TimeBase::utc(JAN_2022_MS + 500);
        assert_eq!(base.relative_secs(civil(0, 0, 10)), 9);
        // An event before the reference truncates toward zero too.
        assert_eq!(base.relative_secs(civil(0, 0, 0)), 0);
    }

    #[test]
    fn relative_secs_honors_fixed_offset() {
        // Log written at UTC+1: civil 01:00:10 is 00:00:10 UTC.
        let offset = FixedOffset::east_opt(3600).unwrap();
        let base = TimeBase::new(JAN_2022_MS, offset);
        assert_eq!(base.relative_secs(civil(1, 0, 10)), 10);
    }

    #[test]
    fn round_up_snaps_to_next_multiple() {
        assert_eq!(round_up_to_interval(10, 20), 20);
        assert_eq!(round_up_to_interval(1799, 20), 1800);
        assert_eq!(round_up_to_interval(21, 20), 40);
    }

    #[test]
    fn round_up_keeps_aligned_values() {
        assert_eq!(round_up_to_interval(0, 20), 0);
        assert_eq!(round_up_to_interval(20, 20), 20);
        assert_eq!(round_up_to_interval(1800, 20), 1800);
    }

    #[test]
    fn round_up_ignores_non_positive_intervals() {
        assert_eq!(round_up_to_interval(10, 0), 10);
        assert_eq!(round_up_to_interval(10, -5), 10);
    }
}
