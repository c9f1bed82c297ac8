//! Recurrence expansion.

pub mod calendar;
mod collapse;
mod expander;

pub use expander::RecurrenceExpander;

use crate::context::CalendarContext;
use crate::error::{EngineError, EngineResult};
use crate::model::{Granularity, Occurrence, ScheduleEvent, ViewWindow};

/// ## Summary
/// Generates the recurrence instances of `event` that may intersect `window`.
///
/// The defining instance is never included. One-off events and events with
/// a malformed recurrence yield an empty list. Sub-daily cadences are
/// collapsed to one representative per day when `granularity` asks for it.
///
/// ## Errors
/// Returns `EngineError::NegativeDuration` when the event ends before it
/// starts, and `EngineError::TimestampOutOfRange` when its start cannot be
/// placed on the calendar.
pub fn expand<'e>(
    event: &'e ScheduleEvent,
    window: ViewWindow,
    granularity: Granularity,
    ctx: &CalendarContext,
) -> EngineResult<Vec<Occurrence<'e>>> {
    let Some(rule) = event.recurrence() else {
        return Ok(Vec::new());
    };
    if event.duration_secs() < 0 {
        return Err(EngineError::NegativeDuration {
            event_id: event.event_id,
        });
    }

    let expander = RecurrenceExpander::new(event, rule, window, ctx);
    if rule.is_high_frequency() && granularity.collapses_high_frequency() {
        expander.collapse()
    } else {
        expander.expand()
    }
}
