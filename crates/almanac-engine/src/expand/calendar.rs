//! Wall-clock helpers over the context timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::{EngineError, EngineResult};

/// ## Summary
/// Converts epoch seconds to a zoned date-time.
///
/// ## Errors
/// Returns `EngineError::TimestampOutOfRange` if chrono cannot represent it.
pub fn local_datetime(tz: Tz, secs: i64) -> EngineResult<DateTime<Tz>> {
    DateTime::from_timestamp(secs, 0)
        .map(|utc| utc.with_timezone(&tz))
        .ok_or(EngineError::TimestampOutOfRange(secs))
}

/// ## Summary
/// Local calendar day containing the instant.
///
/// ## Errors
/// Returns `EngineError::TimestampOutOfRange` if chrono cannot represent it.
pub fn calendar_day(tz: Tz, secs: i64) -> EngineResult<NaiveDate> {
    local_datetime(tz, secs).map(|local| local.date_naive())
}

/// ## Summary
/// Resolves a wall-clock time to epoch seconds.
///
/// Ambiguous times take the earlier instant. Times inside a DST gap are
/// pushed forward by an hour.
#[must_use]
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .map(|resolved| resolved.timestamp())
}

/// First instant of the local day.
#[must_use]
pub fn start_of_day(tz: Tz, date: NaiveDate) -> Option<i64> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Epoch milliseconds to whole seconds, rounding toward negative infinity.
#[must_use]
pub const fn floor_secs(ms: i64) -> i64 {
    ms.div_euclid(1_000)
}

/// Epoch milliseconds to whole seconds, rounding toward positive infinity.
#[must_use]
pub const fn ceil_secs(ms: i64) -> i64 {
    let secs = ms.div_euclid(1_000);
    if ms.rem_euclid(1_000) == 0 { secs } else { secs + 1 }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use chrono_tz::Europe::Berlin;

    use super::*;

    #[test]
    fn calendar_day_follows_timezone() {
        // 2026-01-05T23:30:00Z is already the 6th in Berlin
        let secs = 1_767_655_800;
        assert_eq!(
            calendar_day(Tz::UTC, secs).ok(),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
        assert_eq!(
            calendar_day(Berlin, secs).ok(),
            NaiveDate::from_ymd_opt(2026, 1, 6)
        );
        assert!(calendar_day(Tz::UTC, i64::MAX).is_err());
    }

    #[test]
    fn gap_times_move_forward() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).expect("valid date");
        let in_gap = date.and_hms_opt(2, 30, 0).expect("valid time");
        let resolved = resolve_local(Berlin, in_gap).expect("resolvable");
        let local = local_datetime(Berlin, resolved).expect("in range");
        assert_eq!((local.hour(), local.minute()), (3, 30));
    }

    #[test]
    fn ambiguous_times_take_earliest() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 25).expect("valid date");
        let repeated = date.and_hms_opt(2, 30, 0).expect("valid time");
        let resolved = resolve_local(Berlin, repeated).expect("resolvable");
        // 02:30 CEST is 00:30 UTC
        assert_eq!(resolved, 1_792_888_200);
    }

    #[test]
    fn millisecond_rounding() {
        assert_eq!(floor_secs(1_500), 1);
        assert_eq!(ceil_secs(1_500), 2);
        assert_eq!(ceil_secs(2_000), 2);
        assert_eq!(floor_secs(-1), -1);
        assert_eq!(ceil_secs(-1), 0);
    }
}
