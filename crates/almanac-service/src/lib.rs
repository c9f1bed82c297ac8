//! Event feed access and refresh coordination around the occurrence engine.

pub mod error;
pub mod feed;
pub mod localization;
pub mod view;

pub use error::{ServiceError, ServiceResult};
pub use feed::{EventSource, HttpFeed};
pub use localization::load_catalog;
pub use view::{CalendarView, load_occurrences};
