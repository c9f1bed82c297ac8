//! One representative per day for sub-daily cadences at coarse granularity.

use chrono::NaiveDate;

use super::calendar::{calendar_day, ceil_secs, floor_secs, resolve_local, start_of_day};
use super::expander::{Flow, RecurrenceExpander};
use crate::error::EngineResult;
use crate::model::Occurrence;

impl<'e> RecurrenceExpander<'e, '_> {
    /// First real instance starting at or after `secs`.
    fn first_real_at_or_after(&self, secs: i64) -> Option<i64> {
        let step = self.rule.fixed_step_secs()?;
        let from = self.event.from_dt;
        if secs <= from {
            return Some(from);
        }
        let elapsed = secs.checked_sub(from)?;
        let steps = elapsed.div_euclid(step) + i64::from(elapsed.rem_euclid(step) != 0);
        steps.checked_mul(step).and_then(|offset| from.checked_add(offset))
    }

    /// Accepts `secs` as the representative for `day` if it starts on that day
    /// before the limit.
    fn fits_day(&self, secs: i64, day: NaiveDate) -> bool {
        !self.reached_limit(secs)
            && calendar_day(self.ctx.timezone, secs).is_ok_and(|actual| actual == day)
    }

    /// ## Summary
    /// Synthesizes one flagged occurrence per local day overlapping the window.
    ///
    /// Each representative sits at the source time of day. On the first day it
    /// never precedes the first real instance inside the window. When the
    /// anchor misses the day, the day's first real instance stands in, and days
    /// with neither are skipped.
    ///
    /// ## Errors
    /// Returns `EngineError::TimestampOutOfRange` if the event start or window
    /// bounds cannot be placed on the calendar.
    pub fn collapse(mut self) -> EngineResult<Vec<Occurrence<'e>>> {
        let tz = self.ctx.timezone;
        let (origin_date, origin_time) = self.origin()?;
        let window_day = calendar_day(tz, floor_secs(self.window_start_ms))?;
        let last_day = calendar_day(tz, floor_secs(self.limit_ms.saturating_sub(1)))?;
        let first_day = origin_date.max(window_day);
        let earliest = ceil_secs(self.window_start_ms).max(self.event.from_dt);

        let mut cursor = Some(first_day);
        while let Some(day) = cursor.filter(|day| *day <= last_day) {
            cursor = day.succ_opt();

            let mut candidate = resolve_local(tz, day.and_time(origin_time));
            if day == first_day {
                let first_real = self.first_real_at_or_after(earliest);
                candidate = match (candidate, first_real) {
                    (Some(anchor), Some(real)) => Some(anchor.max(real)),
                    (anchor, real) => anchor.or(real),
                };
            }

            let representative = candidate.filter(|secs| self.fits_day(*secs, day)).or_else(|| {
                let day_start = start_of_day(tz, day)?.max(self.event.from_dt);
                self.first_real_at_or_after(day_start)
                    .filter(|secs| self.fits_day(*secs, day))
            });
            let Some(start) = representative else {
                tracing::trace!(event_id = self.event.event_id, %day, "No instance on day");
                continue;
            };

            if self.accept(Occurrence::collapsed(self.event, start)) == Flow::Stop {
                break;
            }
        }

        tracing::debug!(
            event_id = self.event.event_id,
            representatives = self.occurrences.len(),
            "Collapsed high-frequency recurrence"
        );
        Ok(self.occurrences)
    }
}
