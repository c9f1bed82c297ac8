//! Input records, derived occurrences and render output.

mod event;
mod occurrence;
mod render;
pub mod wire;
mod window;

pub use event::{
    DisplayGroupRef, EventButton, MonthlyRepeatsOn, RecurrencePattern, RecurrenceRule,
    RecurrenceType, ScheduleEvent, WeekdaySet,
};
pub use occurrence::Occurrence;
pub use render::CalendarEventRenderModel;
pub use wire::{decode_event_array, decode_events};
pub use window::{Granularity, ViewWindow};
