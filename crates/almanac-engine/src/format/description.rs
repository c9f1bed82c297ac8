//! Human-readable recurrence summaries appended to grouped titles.

use chrono::Datelike;

use crate::context::CalendarContext;
use crate::expand::calendar::local_datetime;
use crate::format::catalog::{LocalizeError, Localizer, keys, localize};
use crate::model::{MonthlyRepeatsOn, RecurrencePattern, RecurrenceType, ScheduleEvent};

const UNTIL_FORMAT: &str = "%Y-%m-%d %H:%M";

fn unit_key(kind: RecurrenceType, interval: u32) -> String {
    let plural = if interval == 1 { "one" } else { "other" };
    format!("unit.{}.{plural}", kind.as_str().to_ascii_lowercase())
}

fn weekday_name(localizer: &dyn Localizer, number: u32) -> Result<String, LocalizeError> {
    localize(localizer, &format!("weekday.{number}"), &[])
}

/// ## Summary
/// Describes an event's recurrence, e.g. "Repeats every 2 weeks on Mon, Wed".
///
/// `same_day_count` adds how many instances fall on the grouped day.
///
/// ## Errors
/// Returns `LocalizeError::NotRecurring` for one-off events,
/// `LocalizeError::InvalidTimestamp` if a date cannot be shown and any
/// lookup failure from the catalog.
pub fn describe_recurrence(
    ctx: &CalendarContext,
    event: &ScheduleEvent,
    same_day_count: Option<usize>,
) -> Result<String, LocalizeError> {
    let rule = event
        .recurrence()
        .ok_or(LocalizeError::NotRecurring(event.event_id))?;
    let localizer = ctx.localizer.as_ref();

    let unit = localize(localizer, &unit_key(rule.pattern.kind(), rule.interval), &[])?;
    let mut text = localize(
        localizer,
        keys::REPEATS_EVERY,
        &[&rule.interval.to_string(), &unit],
    )?;

    match rule.pattern {
        RecurrencePattern::Week { days: Some(days) } => {
            let names = days
                .iter()
                .map(|day| weekday_name(localizer, day.number_from_monday()))
                .collect::<Result<Vec<_>, _>>()?;
            text = localize(localizer, keys::ON_WEEKDAYS, &[&text, &names.join(", ")])?;
        }
        RecurrencePattern::Month {
            repeats_on: MonthlyRepeatsOn::NthWeekday,
        } => {
            let origin = local_datetime(ctx.timezone, event.from_dt)
                .ok()
                .ok_or(LocalizeError::InvalidTimestamp(event.from_dt))?;
            let nth = (origin.day() - 1) / 7 + 1;
            let ordinal = localize(localizer, &format!("ordinal.{nth}"), &[])?;
            let weekday = weekday_name(localizer, origin.weekday().number_from_monday())?;
            text = localize(localizer, keys::ON_NTH_WEEKDAY, &[&text, &ordinal, &weekday])?;
        }
        _ => {}
    }

    if let Some(until) = rule.until {
        let end = local_datetime(ctx.timezone, until)
            .ok()
            .ok_or(LocalizeError::InvalidTimestamp(until))?;
        text = localize(
            localizer,
            keys::UNTIL,
            &[&text, &end.format(UNTIL_FORMAT).to_string()],
        )?;
    }

    if let Some(count) = same_day_count {
        text = localize(localizer, keys::TIMES_ON_DAY, &[&text, &count.to_string()])?;
    }

    Ok(text)
}
