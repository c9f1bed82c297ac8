//! Recurring schedule occurrence engine.
//!
//! Turns schedule events (some carrying recurrence rules) and a visible
//! calendar window into render-ready calendar entries: recurrences are
//! expanded, sub-daily cadences collapsed at month granularity, and
//! same-day repeats folded into one annotated entry per event and day.

pub mod context;
pub mod error;
pub mod expand;
pub mod format;
pub mod group;
pub mod model;
pub mod pipeline;

pub use context::{CalendarContext, EditUrlTemplate};
pub use error::{EngineError, EngineResult};
pub use format::catalog::{Catalog, LocalizeError, Localizer};
pub use model::{
    CalendarEventRenderModel, Granularity, Occurrence, RecurrenceType, ScheduleEvent, ViewWindow,
};
pub use pipeline::compute_occurrences;
