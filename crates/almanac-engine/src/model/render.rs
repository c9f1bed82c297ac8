use serde::Serialize;

use super::event::ScheduleEvent;

/// Render-ready calendar entry consumed by the calendar widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventRenderModel {
    pub id: i64,
    pub title: String,
    pub url: String,
    /// Epoch milliseconds.
    pub start: i64,
    /// Epoch milliseconds.
    pub end: i64,
    pub same_day: bool,
    pub editable: bool,
    pub recurring_event: bool,
    pub high_frequency: bool,
    pub event: ScheduleEvent,
}
