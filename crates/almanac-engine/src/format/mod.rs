//! Presentation of occurrences: titles, links and recurrence descriptions.

pub mod catalog;
pub mod description;
pub mod title;

pub use catalog::{Catalog, LocalizeError, Localizer, localize};
pub use description::describe_recurrence;
pub use title::{base_title, format_occurrence};
