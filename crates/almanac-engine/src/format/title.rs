//! Titles, links and day flags for a single occurrence.

use crate::context::CalendarContext;
use crate::expand::calendar::calendar_day;
use crate::format::catalog::{LocalizeError, keys, localize};
use crate::model::{CalendarEventRenderModel, Occurrence, ScheduleEvent};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// What is being shown: the parent campaign, then the campaign, then the command.
fn subject_label(event: &ScheduleEvent) -> Option<&str> {
    non_empty(event.parent_campaign_name.as_deref())
        .or_else(|| non_empty(event.campaign.as_deref()))
        .or_else(|| non_empty(event.command.as_deref()))
}

/// Where it is shown: the precomputed list, then the first display group.
fn display_label(event: &ScheduleEvent) -> Option<&str> {
    non_empty(event.display_group_list.as_deref()).or_else(|| {
        event
            .display_groups
            .first()
            .and_then(|group| non_empty(group.display_group.as_deref()))
    })
}

/// ## Summary
/// Builds the unsuffixed title: optional quoted name, then "<event> on <display>".
///
/// ## Errors
/// Returns a `LocalizeError` when a required template is missing or malformed.
pub fn base_title(ctx: &CalendarContext, event: &ScheduleEvent) -> Result<String, LocalizeError> {
    let localizer = ctx.localizer.as_ref();
    let subject = match subject_label(event) {
        Some(label) => label.to_string(),
        None => localize(localizer, keys::UNKNOWN_EVENT, &[])?,
    };
    let display = match display_label(event) {
        Some(label) => label.to_string(),
        None => localize(localizer, keys::UNKNOWN_DISPLAY, &[])?,
    };
    let title = localize(localizer, keys::EVENT_ON_DISPLAY, &[&subject, &display])?;

    match non_empty(event.name.as_deref()) {
        Some(name) => localize(localizer, keys::NAMED_TITLE, &[name, &title]),
        None => Ok(title),
    }
}

/// Title used when the catalog cannot produce one.
fn plain_title(event: &ScheduleEvent) -> String {
    let subject = subject_label(event)
        .map_or_else(|| format!("#{}", event.event_id), str::to_string);
    let title = match display_label(event) {
        Some(display) => format!("{subject} on {display}"),
        None => subject,
    };
    match non_empty(event.name.as_deref()) {
        Some(name) => format!("\"{name}\" {title}"),
        None => title,
    }
}

/// ## Summary
/// Turns one occurrence into a render model with its unsuffixed title.
///
/// Localization failures fall back to a plain title and are logged.
#[must_use]
pub fn format_occurrence(ctx: &CalendarContext, occurrence: &Occurrence<'_>) -> CalendarEventRenderModel {
    let event = occurrence.event;

    let title = base_title(ctx, event).unwrap_or_else(|error| {
        tracing::warn!(event_id = event.event_id, %error, "Falling back to plain title");
        plain_title(event)
    });

    let url = event
        .edit_button_url()
        .map_or_else(|| ctx.edit_url.render(event.event_id), str::to_string);

    let same_day = match (
        calendar_day(ctx.timezone, occurrence.from_dt),
        calendar_day(ctx.timezone, occurrence.to_dt),
    ) {
        (Ok(start), Ok(end)) => start == end,
        _ => false,
    };

    CalendarEventRenderModel {
        id: event.event_id,
        title,
        url,
        start: occurrence.start_ms(),
        end: occurrence.end_ms(),
        same_day,
        editable: event.is_editable,
        recurring_event: event.recurrence().is_some(),
        high_frequency: occurrence.is_high_frequency,
        event: event.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono_tz::America::Los_Angeles;

    use super::*;
    use crate::format::catalog::Catalog;
    use crate::model::{DisplayGroupRef, EventButton, RecurrenceType};

    fn campaign_event() -> ScheduleEvent {
        let mut event = ScheduleEvent::new(12, 1_767_603_600, 1_767_607_200);
        event.campaign = Some("Spring Promo".to_string());
        event.display_groups.push(DisplayGroupRef {
            display_group_id: Some(3),
            display_group: Some("Lobby".to_string()),
        });
        event
    }

    #[test]
    fn title_prefers_parent_campaign_and_group_list() {
        let ctx = CalendarContext::default();
        let mut event = campaign_event();
        assert_eq!(base_title(&ctx, &event).ok().as_deref(), Some("Spring Promo on Lobby"));

        event.parent_campaign_name = Some("Seasonal".to_string());
        event.display_group_list = Some("Lobby, Foyer".to_string());
        event.name = Some("Morning".to_string());
        assert_eq!(
            base_title(&ctx, &event).ok().as_deref(),
            Some("\"Morning\" Seasonal on Lobby, Foyer")
        );
    }

    #[test]
    fn title_uses_command_and_placeholders() {
        let ctx = CalendarContext::default();
        let mut event = ScheduleEvent::new(5, 0, 60);
        assert_eq!(
            base_title(&ctx, &event).ok().as_deref(),
            Some("Untitled event on no displays")
        );

        event.command = Some("Reboot".to_string());
        assert_eq!(base_title(&ctx, &event).ok().as_deref(), Some("Reboot on no displays"));
    }

    #[test]
    fn broken_catalog_falls_back_to_plain_title() {
        let ctx = CalendarContext::default().with_localizer(Arc::new(Catalog::default()));
        let event = campaign_event();
        let model = format_occurrence(&ctx, &Occurrence::defining(&event));
        assert_eq!(model.title, "Spring Promo on Lobby");
    }

    #[test]
    fn url_prefers_edit_button() {
        let ctx = CalendarContext::default();
        let mut event = campaign_event();
        assert_eq!(
            format_occurrence(&ctx, &Occurrence::defining(&event)).url,
            "/schedule/form/edit/12"
        );

        event.buttons.push(EventButton {
            id: Some("schedule_button_edit".to_string()),
            url: Some("/schedule/form/edit/12?x=1".to_string()),
            text: None,
        });
        assert_eq!(
            format_occurrence(&ctx, &Occurrence::defining(&event)).url,
            "/schedule/form/edit/12?x=1"
        );
    }

    #[test]
    fn model_copies_flags_and_bounds() {
        let ctx = CalendarContext::default();
        let mut event = campaign_event().repeating(RecurrenceType::Day, 1);
        event.is_editable = true;

        let model = format_occurrence(&ctx, &Occurrence::starting_at(&event, 1_767_690_000));
        assert_eq!(model.id, 12);
        assert_eq!(model.start, 1_767_690_000_000);
        assert_eq!(model.end, 1_767_693_600_000);
        assert!(model.editable);
        assert!(model.recurring_event);
        assert!(!model.high_frequency);
        assert!(model.same_day);
    }

    #[test]
    fn same_day_uses_context_timezone() {
        // 2026-01-05 23:00 to 2026-01-06 01:00 UTC, still the 5th in Los Angeles
        let event = ScheduleEvent::new(1, 1_767_654_000, 1_767_661_200);
        let occurrence = Occurrence::defining(&event);

        assert!(!format_occurrence(&CalendarContext::default(), &occurrence).same_day);
        assert!(format_occurrence(&CalendarContext::new(Los_Angeles), &occurrence).same_day);
    }
}
