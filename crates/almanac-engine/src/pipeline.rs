//! The public entry point: events in, render models out.

use std::iter;

use crate::context::CalendarContext;
use crate::expand::expand;
use crate::format::catalog::{keys, localize};
use crate::format::description::describe_recurrence;
use crate::format::title::format_occurrence;
use crate::group::{DayGroup, DayGrouper};
use crate::model::{CalendarEventRenderModel, Granularity, Occurrence, ScheduleEvent, ViewWindow};

/// ## Summary
/// Computes the calendar entries visible in `window`.
///
/// Each event contributes its defining instance plus its recurrence
/// instances. Instances touching the window only at a boundary are dropped,
/// and the rest are folded to one entry per event and local day. Entries
/// come out in the order their day groups were first seen.
///
/// Failures are isolated per event: a broken recurrence degrades to the
/// defining instance and a broken description to the plain title.
#[must_use]
pub fn compute_occurrences(
    ctx: &CalendarContext,
    events: &[ScheduleEvent],
    window: ViewWindow,
    granularity: Granularity,
) -> Vec<CalendarEventRenderModel> {
    let mut grouper = DayGrouper::new(ctx.timezone);

    for event in events {
        let expanded = expand(event, window, granularity, ctx).unwrap_or_else(|error| {
            tracing::warn!(
                event_id = event.event_id,
                %error,
                "Recurrence expansion failed, using defining instance only"
            );
            Vec::new()
        });

        let visible = iter::once(Occurrence::defining(event))
            .chain(expanded)
            .filter(|occurrence| window.intersects(occurrence));
        for occurrence in visible {
            if let Err(error) = grouper.insert(occurrence) {
                tracing::warn!(
                    event_id = event.event_id,
                    from_dt = occurrence.from_dt,
                    %error,
                    "Skipping occurrence without a calendar day"
                );
            }
        }
    }

    let groups = grouper.into_groups();
    tracing::debug!(
        events = events.len(),
        entries = groups.len(),
        %granularity,
        "Computed occurrences"
    );
    groups.iter().map(|group| render_group(ctx, group)).collect()
}

fn render_group(ctx: &CalendarContext, group: &DayGroup<'_>) -> CalendarEventRenderModel {
    let first = &group.first;
    let collapsed = group.is_collapsed();
    let mut model = format_occurrence(ctx, first);
    model.high_frequency = collapsed;

    let recurring = first.event.recurrence().is_some();
    let needs_suffix = group.count() > 1 || (recurring && first.is_high_frequency);
    if !needs_suffix {
        return model;
    }

    let same_day_count = (!collapsed && group.count() > 1).then_some(group.count());
    let suffixed = describe_recurrence(ctx, first.event, same_day_count).and_then(|description| {
        localize(
            ctx.localizer.as_ref(),
            keys::WITH_RECURRENCE,
            &[&model.title, &description],
        )
    });
    match suffixed {
        Ok(title) => model.title = title,
        Err(error) => tracing::warn!(
            event_id = first.event.event_id,
            day = %group.key.day,
            %error,
            "Could not describe recurrence, keeping plain title"
        ),
    }
    model
}
