use std::str::FromStr;

use anyhow::Result;
use chrono_tz::Tz;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{DEFAULT_EDIT_URL_TEMPLATE, DEFAULT_MAX_OCCURRENCES, EVENT_ID_PLACEHOLDER};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Calendar arithmetic and presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// IANA name of the zone that defines calendar days and wall-clock time.
    pub timezone: String,
    /// Fallback edit link, `{eventId}` is replaced with the event id.
    pub edit_url_template: String,
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: usize,
    /// Optional TOML/JSON file overriding the built-in English strings.
    pub catalog_path: Option<String>,
}

impl CalendarConfig {
    /// ## Summary
    /// Resolves the configured timezone name.
    ///
    /// ## Errors
    /// Returns `CoreError::UnknownTimezone` if the name is not in the tz database.
    pub fn timezone(&self) -> CoreResult<Tz> {
        Tz::from_str(self.timezone.trim())
            .map_err(|_err| CoreError::UnknownTimezone(self.timezone.clone()))
    }
}

/// Upstream schedule event source.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

const fn default_max_occurrences() -> usize {
    DEFAULT_MAX_OCCURRENCES
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and `config.toml` into a `Settings`.
    /// Environment variables (`ALMANAC__SECTION__KEY`) take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the configuration fails.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(config::File::with_name("config.toml").required(false))
                .add_source(
                    config::Environment::with_prefix("ALMANAC")
                        .prefix_separator("__")
                        .separator("__")
                        .ignore_empty(true)
                        .try_parsing(true),
                ),
        )
    }

    /// ## Summary
    /// Applies defaults on top of the given sources, then deserializes and validates.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the configuration fails.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8699)?
            .set_default("logging.level", "info")?
            .set_default("calendar.timezone", "UTC")?
            .set_default("calendar.edit_url_template", DEFAULT_EDIT_URL_TEMPLATE)?
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize fine but cannot drive a computation.
    ///
    /// ## Errors
    /// Returns a `CoreError` naming the first offending setting.
    pub fn validate(&self) -> CoreResult<()> {
        self.calendar.timezone()?;
        if !self
            .calendar
            .edit_url_template
            .contains(EVENT_ID_PLACEHOLDER)
        {
            return Err(CoreError::InvalidUrlTemplate(
                self.calendar.edit_url_template.clone(),
            ));
        }
        if self.calendar.max_occurrences == 0 {
            return Err(CoreError::InvalidConfiguration(
                "calendar.max_occurrences must be positive".to_string(),
            ));
        }
        if self.feed.timeout_secs == 0 {
            return Err(CoreError::InvalidConfiguration(
                "feed.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(source: &str) -> Result<Settings> {
        Settings::from_builder(
            Config::builder().add_source(config::File::from_str(source, FileFormat::Toml)),
        )
    }

    #[test_log::test]
    fn defaults_fill_missing_sections() {
        let settings = from_toml("").expect("defaults are valid");

        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8699");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.calendar.timezone().expect("utc"), Tz::UTC);
        assert_eq!(settings.calendar.edit_url_template, DEFAULT_EDIT_URL_TEMPLATE);
        assert_eq!(settings.calendar.max_occurrences, DEFAULT_MAX_OCCURRENCES);
        assert!(settings.calendar.catalog_path.is_none());
        assert!(settings.feed.url.is_none());
        assert_eq!(settings.feed.timeout_secs, 30);
    }

    #[test_log::test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 9000

            [calendar]
            timezone = "Europe/London"
            max_occurrences = 500

            [feed]
            url = "http://cms.local/schedule/events"
            timeout_secs = 5
            "#,
        )
        .expect("valid settings");

        assert_eq!(settings.server.port, 9000);
        assert_eq!(
            settings.calendar.timezone().expect("known zone"),
            chrono_tz::Europe::London
        );
        assert_eq!(settings.calendar.max_occurrences, 500);
        assert_eq!(
            settings.feed.url.as_deref(),
            Some("http://cms.local/schedule/events")
        );
        assert_eq!(settings.feed.timeout_secs, 5);
    }

    #[test_log::test]
    fn unknown_timezone_is_rejected() {
        let err = from_toml("[calendar]\ntimezone = \"Mars/Olympus\"\n")
            .expect_err("unknown zone must fail");
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test_log::test]
    fn template_without_placeholder_is_rejected() {
        let err = from_toml("[calendar]\nedit_url_template = \"/schedule/edit\"\n")
            .expect_err("template needs a placeholder");
        assert!(err.to_string().contains("/schedule/edit"));
    }

    #[test_log::test]
    fn zero_occurrence_cap_is_rejected() {
        assert!(from_toml("[calendar]\nmax_occurrences = 0\n").is_err());
    }
}
