//! Localized message templates.
//!
//! Templates use positional placeholders (`{0}`, `{1}`, …). Anything between
//! braces that is not a number is copied through literally.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Message keys understood by the formatter.
pub mod keys {
    pub const EVENT_ON_DISPLAY: &str = "title.event_on_display";
    pub const NAMED_TITLE: &str = "title.named";
    pub const UNKNOWN_EVENT: &str = "title.unknown_event";
    pub const UNKNOWN_DISPLAY: &str = "title.unknown_display";
    pub const WITH_RECURRENCE: &str = "title.with_recurrence";

    pub const REPEATS_EVERY: &str = "recurrence.every";
    pub const ON_WEEKDAYS: &str = "recurrence.on_weekdays";
    pub const ON_NTH_WEEKDAY: &str = "recurrence.on_nth_weekday";
    pub const UNTIL: &str = "recurrence.until";
    pub const TIMES_ON_DAY: &str = "recurrence.times_on_day";
}

/// Source of message templates.
pub trait Localizer: Send + Sync + fmt::Debug {
    /// Returns the template for `key`, if one is known.
    fn template(&self, key: &str) -> Option<&str>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("No translation for key {0}")]
    MissingKey(String),

    #[error("Template {key} references argument {index} but only {provided} were supplied")]
    MissingArgument {
        key: String,
        index: usize,
        provided: usize,
    },

    #[error("Event {0} has no recurrence to describe")]
    NotRecurring(i64),

    #[error("Timestamp {0} cannot be shown as a calendar date")]
    InvalidTimestamp(i64),
}

/// ## Summary
/// Looks up `key` and substitutes positional arguments.
///
/// ## Errors
/// Returns `LocalizeError::MissingKey` for unknown keys and
/// `LocalizeError::MissingArgument` when the template needs more arguments.
pub fn localize(localizer: &dyn Localizer, key: &str, args: &[&str]) -> Result<String, LocalizeError> {
    let template = localizer
        .template(key)
        .ok_or_else(|| LocalizeError::MissingKey(key.to_string()))?;

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|index| (index, close)));
        match placeholder {
            Some((index, close)) => {
                let arg = args.get(index).ok_or_else(|| LocalizeError::MissingArgument {
                    key: key.to_string(),
                    index,
                    provided: args.len(),
                })?;
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// In-memory template table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: HashMap<String, String>,
}

const ENGLISH: &[(&str, &str)] = &[
    (keys::EVENT_ON_DISPLAY, "{0} on {1}"),
    (keys::NAMED_TITLE, "\"{0}\" {1}"),
    (keys::UNKNOWN_EVENT, "Untitled event"),
    (keys::UNKNOWN_DISPLAY, "no displays"),
    (keys::WITH_RECURRENCE, "{0} ({1})"),
    (keys::REPEATS_EVERY, "Repeats every {0} {1}"),
    (keys::ON_WEEKDAYS, "{0} on {1}"),
    (keys::ON_NTH_WEEKDAY, "{0} on the {1} {2}"),
    (keys::UNTIL, "{0} until {1}"),
    (keys::TIMES_ON_DAY, "{0}, {1} times on this day"),
    ("unit.minute.one", "minute"),
    ("unit.minute.other", "minutes"),
    ("unit.hour.one", "hour"),
    ("unit.hour.other", "hours"),
    ("unit.day.one", "day"),
    ("unit.day.other", "days"),
    ("unit.week.one", "week"),
    ("unit.week.other", "weeks"),
    ("unit.month.one", "month"),
    ("unit.month.other", "months"),
    ("unit.year.one", "year"),
    ("unit.year.other", "years"),
    ("weekday.1", "Mon"),
    ("weekday.2", "Tue"),
    ("weekday.3", "Wed"),
    ("weekday.4", "Thu"),
    ("weekday.5", "Fri"),
    ("weekday.6", "Sat"),
    ("weekday.7", "Sun"),
    ("ordinal.1", "first"),
    ("ordinal.2", "second"),
    ("ordinal.3", "third"),
    ("ordinal.4", "fourth"),
    ("ordinal.5", "fifth"),
];

impl Catalog {
    /// Built-in English strings.
    #[must_use]
    pub fn english() -> Self {
        Self {
            templates: ENGLISH
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// Replaces or adds templates, keeping every key not mentioned.
    pub fn extend(&mut self, overrides: impl IntoIterator<Item = (String, String)>) {
        self.templates.extend(overrides);
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.templates.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Localizer for Catalog {
    fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}
