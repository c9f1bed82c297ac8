use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime};

use super::calendar::{local_datetime, resolve_local, start_of_day};
use crate::context::CalendarContext;
use crate::error::EngineResult;
use crate::model::{
    MonthlyRepeatsOn, Occurrence, RecurrencePattern, RecurrenceRule, ScheduleEvent, ViewWindow,
    WeekdaySet,
};

/// Whether expansion should keep going after an occurrence was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Stop,
}

/// Expands one recurring event into the occurrences relevant to a window.
///
/// Every step is derived from the original start (index × interval), so day of
/// month clamping and DST shifts never accumulate.
#[derive(Debug)]
pub struct RecurrenceExpander<'e, 'c> {
    pub(super) event: &'e ScheduleEvent,
    pub(super) rule: RecurrenceRule,
    pub(super) ctx: &'c CalendarContext,
    pub(super) window_start_ms: i64,
    /// `min(window end, recurrence range)` in epoch milliseconds.
    pub(super) limit_ms: i64,
    pub(super) occurrences: Vec<Occurrence<'e>>,
}

impl<'e, 'c> RecurrenceExpander<'e, 'c> {
    #[must_use]
    pub fn new(
        event: &'e ScheduleEvent,
        rule: RecurrenceRule,
        window: ViewWindow,
        ctx: &'c CalendarContext,
    ) -> Self {
        let limit_ms = rule
            .until
            .map_or(window.end_ms(), |until| {
                until.saturating_mul(1_000).min(window.end_ms())
            });
        Self {
            event,
            rule,
            ctx,
            window_start_ms: window.start_ms(),
            limit_ms,
            occurrences: Vec::new(),
        }
    }

    /// True once an instance starting at `secs` would reach the window end or range.
    pub(super) const fn reached_limit(&self, secs: i64) -> bool {
        secs.saturating_mul(1_000) >= self.limit_ms
    }

    /// Records an occurrence unless it ends before the window opens.
    pub(super) fn accept(&mut self, occurrence: Occurrence<'e>) -> Flow {
        if occurrence.end_ms() <= self.window_start_ms {
            return Flow::Continue;
        }
        if self.occurrences.len() >= self.ctx.max_occurrences {
            tracing::warn!(
                event_id = self.event.event_id,
                max_occurrences = self.ctx.max_occurrences,
                "Occurrence limit reached, truncating expansion"
            );
            return Flow::Stop;
        }
        self.occurrences.push(occurrence);
        Flow::Continue
    }

    /// ## Summary
    /// Enumerates the occurrences after the defining instance.
    ///
    /// ## Errors
    /// Returns `EngineError::TimestampOutOfRange` if the event start cannot be
    /// placed on the calendar.
    pub fn expand(mut self) -> EngineResult<Vec<Occurrence<'e>>> {
        match self.rule.pattern {
            RecurrencePattern::Minute | RecurrencePattern::Hour => self.expand_fixed(),
            RecurrencePattern::Day => {
                let step = u64::from(self.rule.interval);
                self.expand_by_date(|origin, index| {
                    step.checked_mul(index)
                        .and_then(|days| origin.checked_add_days(Days::new(days)))
                })?;
            }
            RecurrencePattern::Week { days: None } => {
                let step = 7 * u64::from(self.rule.interval);
                self.expand_by_date(|origin, index| {
                    step.checked_mul(index)
                        .and_then(|days| origin.checked_add_days(Days::new(days)))
                })?;
            }
            RecurrencePattern::Week { days: Some(days) } => self.expand_weekdays(days)?,
            RecurrencePattern::Month {
                repeats_on: MonthlyRepeatsOn::DayOfMonth,
            } => {
                let step = self.rule.interval;
                self.expand_by_date(|origin, index| {
                    u32::try_from(index)
                        .ok()
                        .and_then(|index| step.checked_mul(index))
                        .and_then(|months| origin.checked_add_months(Months::new(months)))
                })?;
            }
            RecurrencePattern::Month {
                repeats_on: MonthlyRepeatsOn::NthWeekday,
            } => self.expand_nth_weekday()?,
            RecurrencePattern::Year => {
                let step = self.rule.interval;
                self.expand_by_date(|origin, index| {
                    u32::try_from(index)
                        .ok()
                        .and_then(|index| step.checked_mul(index))
                        .and_then(|years| years.checked_mul(12))
                        .and_then(|months| origin.checked_add_months(Months::new(months)))
                })?;
            }
        }

        tracing::trace!(
            event_id = self.event.event_id,
            kind = %self.rule.pattern.kind(),
            interval = self.rule.interval,
            count = self.occurrences.len(),
            "Expanded recurrence"
        );
        Ok(self.occurrences)
    }

    pub(super) fn origin(&self) -> EngineResult<(NaiveDate, NaiveTime)> {
        let local = local_datetime(self.ctx.timezone, self.event.from_dt)?;
        Ok((local.date_naive(), local.time()))
    }

    /// Minute and hour cadences step in absolute time.
    fn expand_fixed(&mut self) {
        let Some(step) = self.rule.fixed_step_secs() else {
            return;
        };
        let from = self.event.from_dt;
        let duration = self.event.duration_secs();

        // Jump straight to the last step that still ends before the window.
        let behind_ms = self.window_start_ms
            .saturating_sub(from.saturating_mul(1_000))
            .saturating_sub(duration.saturating_mul(1_000));
        let mut index = (behind_ms / step.saturating_mul(1_000)).max(1);

        loop {
            let Some(start) = index
                .checked_mul(step)
                .and_then(|offset| from.checked_add(offset))
            else {
                break;
            };
            if self.reached_limit(start)
                || self.accept(Occurrence::starting_at(self.event, start)) == Flow::Stop
            {
                break;
            }
            index += 1;
        }
    }

    /// Steps that land on `nth_date(origin, index)` at the original wall-clock time.
    fn expand_by_date(
        &mut self,
        nth_date: impl Fn(NaiveDate, u64) -> Option<NaiveDate>,
    ) -> EngineResult<()> {
        let (origin_date, origin_time) = self.origin()?;
        let tz = self.ctx.timezone;

        for index in 1_u64.. {
            let Some(start) = nth_date(origin_date, index)
                .and_then(|date| resolve_local(tz, date.and_time(origin_time)))
            else {
                break;
            };
            if self.reached_limit(start)
                || self.accept(Occurrence::starting_at(self.event, start)) == Flow::Stop
            {
                break;
            }
        }
        Ok(())
    }

    /// Weekly cadence restricted to a set of ISO weekdays.
    fn expand_weekdays(&mut self, days: WeekdaySet) -> EngineResult<()> {
        let (origin_date, origin_time) = self.origin()?;
        let tz = self.ctx.timezone;
        let step = 7 * u64::from(self.rule.interval);
        let origin_monday = origin_date
            .checked_sub_days(Days::new(u64::from(origin_date.weekday().num_days_from_monday())));
        let Some(origin_monday) = origin_monday else {
            return Ok(());
        };

        for index in 0_u64.. {
            let Some(monday) = step
                .checked_mul(index)
                .and_then(|offset| origin_monday.checked_add_days(Days::new(offset)))
            else {
                break;
            };
            match start_of_day(tz, monday) {
                Some(week_start) if !self.reached_limit(week_start) => {}
                _ => break,
            }

            for day in days.iter() {
                let Some(start) = monday
                    .checked_add_days(Days::new(u64::from(day.num_days_from_monday())))
                    .and_then(|date| resolve_local(tz, date.and_time(origin_time)))
                else {
                    continue;
                };
                if start <= self.event.from_dt || self.reached_limit(start) {
                    continue;
                }
                if self.accept(Occurrence::starting_at(self.event, start)) == Flow::Stop {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Monthly cadence on the same (week of month, weekday) as the origin.
    ///
    /// Months without that nth weekday are skipped without shifting the cadence.
    fn expand_nth_weekday(&mut self) -> EngineResult<()> {
        let (origin_date, origin_time) = self.origin()?;
        let tz = self.ctx.timezone;
        let weekday = origin_date.weekday();
        let Ok(nth) = u8::try_from((origin_date.day() - 1) / 7 + 1) else {
            return Ok(());
        };
        let Some(origin_month) = origin_date.with_day(1) else {
            return Ok(());
        };

        for index in 1_u32.. {
            let Some(month) = self
                .rule
                .interval
                .checked_mul(index)
                .and_then(|months| origin_month.checked_add_months(Months::new(months)))
            else {
                break;
            };
            match start_of_day(tz, month) {
                Some(month_start) if !self.reached_limit(month_start) => {}
                _ => break,
            }

            let Some(target) =
                NaiveDate::from_weekday_of_month_opt(month.year(), month.month(), weekday, nth)
            else {
                tracing::trace!(
                    event_id = self.event.event_id,
                    year = month.year(),
                    month = month.month(),
                    nth,
                    "Month has no matching weekday, skipping"
                );
                continue;
            };
            let Some(start) = resolve_local(tz, target.and_time(origin_time)) else {
                continue;
            };
            if self.reached_limit(start) {
                break;
            }
            if self.accept(Occurrence::starting_at(self.event, start)) == Flow::Stop {
                break;
            }
        }
        Ok(())
    }
}
