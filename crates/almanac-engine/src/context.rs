//! Explicit per-render inputs that are not part of the event data.

use std::sync::Arc;

use almanac_core::config::CalendarConfig;
use almanac_core::constants::{
    DEFAULT_EDIT_URL_TEMPLATE, DEFAULT_MAX_OCCURRENCES, EVENT_ID_PLACEHOLDER,
};
use almanac_core::error::{CoreError, CoreResult};
use chrono_tz::Tz;

use crate::format::catalog::{Catalog, Localizer};

/// Edit link pattern with an `{eventId}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditUrlTemplate(String);

impl EditUrlTemplate {
    /// ## Summary
    /// Wraps a template string.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidUrlTemplate` if the placeholder is missing.
    pub fn new(template: impl Into<String>) -> CoreResult<Self> {
        let template = template.into();
        if template.contains(EVENT_ID_PLACEHOLDER) {
            Ok(Self(template))
        } else {
            Err(CoreError::InvalidUrlTemplate(template))
        }
    }

    #[must_use]
    pub fn render(&self, event_id: i64) -> String {
        self.0.replace(EVENT_ID_PLACEHOLDER, &event_id.to_string())
    }
}

impl Default for EditUrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_EDIT_URL_TEMPLATE.to_string())
    }
}

/// Everything the pipeline needs besides events, window and granularity.
#[derive(Debug, Clone)]
pub struct CalendarContext {
    /// Zone defining calendar days, wall-clock time-of-day and month arithmetic.
    pub timezone: Tz,
    pub edit_url: EditUrlTemplate,
    /// Per-event bound on generated occurrences.
    pub max_occurrences: usize,
    pub localizer: Arc<dyn Localizer>,
}

impl CalendarContext {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    #[must_use]
    pub fn with_edit_url(mut self, edit_url: EditUrlTemplate) -> Self {
        self.edit_url = edit_url;
        self
    }

    #[must_use]
    pub fn with_max_occurrences(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = max_occurrences;
        self
    }

    /// ## Summary
    /// Builds a context from calendar settings.
    ///
    /// ## Errors
    /// Returns a `CoreError` if the timezone or edit URL template is invalid.
    pub fn from_settings(
        settings: &CalendarConfig,
        localizer: Arc<dyn Localizer>,
    ) -> CoreResult<Self> {
        Ok(Self {
            timezone: settings.timezone()?,
            edit_url: EditUrlTemplate::new(settings.edit_url_template.clone())?,
            max_occurrences: settings.max_occurrences,
            localizer,
        })
    }
}

impl Default for CalendarContext {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            edit_url: EditUrlTemplate::default(),
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            localizer: Arc::new(Catalog::english()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_url_substitutes_event_id() {
        assert_eq!(EditUrlTemplate::default().render(42), "/schedule/form/edit/42");

        let custom = EditUrlTemplate::new("/cms/events/{eventId}/edit").expect("valid template");
        assert_eq!(custom.render(7), "/cms/events/7/edit");

        assert!(EditUrlTemplate::new("/cms/events/edit").is_err());
    }

    #[test]
    fn context_from_settings() {
        let settings = CalendarConfig {
            timezone: "America/New_York".to_string(),
            edit_url_template: "/e/{eventId}".to_string(),
            max_occurrences: 12,
            catalog_path: None,
        };
        let context =
            CalendarContext::from_settings(&settings, Arc::new(Catalog::english())).expect("valid");
        assert_eq!(context.timezone, chrono_tz::America::New_York);
        assert_eq!(context.edit_url.render(3), "/e/3");
        assert_eq!(context.max_occurrences, 12);

        let broken = CalendarConfig {
            timezone: "Nowhere/Special".to_string(),
            ..settings
        };
        assert!(CalendarContext::from_settings(&broken, Arc::new(Catalog::english())).is_err());
    }
}
