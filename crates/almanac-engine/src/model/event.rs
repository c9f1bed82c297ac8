//! Schedule event records as delivered by the event source.

use std::fmt;
use std::str::FromStr;

use almanac_core::constants::EDIT_BUTTON_ID;
use chrono::Weekday;
use serde::{Deserialize, Serialize, Serializer};

use super::wire;
use crate::error::EngineError;

/// Unit of a recurrence cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecurrenceType {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    None,
}

impl RecurrenceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "Minute",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
            Self::None => "",
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        [
            Self::Minute,
            Self::Hour,
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Year,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| EngineError::UnknownRecurrenceType(trimmed.to_string()))
    }
}

impl Serialize for RecurrenceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

/// How a monthly recurrence picks its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonthlyRepeatsOn {
    /// Same day of month, clamped to the month's last day.
    #[default]
    DayOfMonth,
    /// Same (week-of-month, weekday) pair as the original start.
    NthWeekday,
}

impl MonthlyRepeatsOn {
    /// Wire value `1` selects the nth-weekday mode; anything else keeps the day of month.
    #[must_use]
    pub const fn from_wire(value: Option<i64>) -> Self {
        match value {
            Some(1) => Self::NthWeekday,
            _ => Self::DayOfMonth,
        }
    }
}

/// Set of ISO weekdays (Monday = 1 … Sunday = 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// ## Summary
    /// Builds a set from ISO weekday numbers, ignoring values outside 1..=7.
    ///
    /// Returns `None` when no valid weekday remains.
    #[must_use]
    pub fn from_iso_numbers(numbers: impl IntoIterator<Item = i64>) -> Option<Self> {
        let bits = numbers
            .into_iter()
            .filter(|n| (1..=7).contains(n))
            .fold(0_u8, |acc, n| acc | (1 << (n - 1)));
        (bits != 0).then_some(Self(bits))
    }

    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Weekdays in ISO order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |day| self.contains(*day))
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self
            .iter()
            .map(|day| day.number_from_monday().to_string())
            .collect();
        f.write_str(&numbers.join(","))
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGroupRef {
    #[serde(default, deserialize_with = "wire::optional_integer")]
    pub display_group_id: Option<i64>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub display_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventButton {
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub text: Option<String>,
}

/// One schedule event as produced by the external event source.
///
/// `from_dt`/`to_dt` are epoch seconds and define the event's own instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    #[serde(deserialize_with = "wire::integer")]
    pub event_id: i64,
    #[serde(deserialize_with = "wire::integer")]
    pub from_dt: i64,
    #[serde(deserialize_with = "wire::integer")]
    pub to_dt: i64,

    #[serde(default, deserialize_with = "wire::flag")]
    pub recurring_event: bool,
    #[serde(default, deserialize_with = "wire::recurrence_type")]
    pub recurrence_type: RecurrenceType,
    #[serde(default, deserialize_with = "wire::optional_integer")]
    pub recurrence_detail: Option<i64>,
    #[serde(default, deserialize_with = "wire::optional_integer")]
    pub recurrence_range: Option<i64>,
    #[serde(default, deserialize_with = "wire::weekday_set")]
    pub recurrence_repeats_on: Option<WeekdaySet>,
    #[serde(default, deserialize_with = "wire::optional_integer")]
    pub recurrence_monthly_repeats_on: Option<i64>,

    #[serde(default, deserialize_with = "wire::optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub campaign: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub command: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub parent_campaign_name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_text")]
    pub display_group_list: Option<String>,
    #[serde(default, deserialize_with = "wire::list")]
    pub display_groups: Vec<DisplayGroupRef>,
    #[serde(default, deserialize_with = "wire::flag")]
    pub is_editable: bool,
    #[serde(default, deserialize_with = "wire::list")]
    pub buttons: Vec<EventButton>,
}

impl ScheduleEvent {
    /// Creates a non-recurring event with no display metadata.
    #[must_use]
    pub fn new(event_id: i64, from_dt: i64, to_dt: i64) -> Self {
        Self {
            event_id,
            from_dt,
            to_dt,
            recurring_event: false,
            recurrence_type: RecurrenceType::None,
            recurrence_detail: None,
            recurrence_range: None,
            recurrence_repeats_on: None,
            recurrence_monthly_repeats_on: None,
            name: None,
            campaign: None,
            command: None,
            parent_campaign_name: None,
            display_group_list: None,
            display_groups: Vec::new(),
            is_editable: false,
            buttons: Vec::new(),
        }
    }

    /// Marks the event recurring with the given unit and interval.
    #[must_use]
    pub fn repeating(mut self, kind: RecurrenceType, interval: i64) -> Self {
        self.recurring_event = true;
        self.recurrence_type = kind;
        self.recurrence_detail = Some(interval);
        self
    }

    #[must_use]
    pub fn until(mut self, range: i64) -> Self {
        self.recurrence_range = Some(range);
        self
    }

    #[must_use]
    pub fn on_weekdays(mut self, days: WeekdaySet) -> Self {
        self.recurrence_repeats_on = Some(days);
        self
    }

    #[must_use]
    pub fn monthly_on(mut self, repeats_on: MonthlyRepeatsOn) -> Self {
        self.recurrence_monthly_repeats_on = Some(match repeats_on {
            MonthlyRepeatsOn::DayOfMonth => 0,
            MonthlyRepeatsOn::NthWeekday => 1,
        });
        self
    }

    /// Length of every instance of this event, in seconds.
    #[must_use]
    pub const fn duration_secs(&self) -> i64 {
        self.to_dt.saturating_sub(self.from_dt)
    }

    /// ## Summary
    /// Returns the validated recurrence rule, if this event actually recurs.
    ///
    /// Records with a missing or non-positive interval, or no recurrence
    /// unit, are treated as one-off events.
    #[must_use]
    pub fn recurrence(&self) -> Option<RecurrenceRule> {
        if !self.recurring_event {
            return None;
        }
        let interval = self
            .recurrence_detail
            .filter(|detail| *detail > 0)
            .and_then(|detail| u32::try_from(detail).ok())?;
        let pattern = match self.recurrence_type {
            RecurrenceType::Minute => RecurrencePattern::Minute,
            RecurrenceType::Hour => RecurrencePattern::Hour,
            RecurrenceType::Day => RecurrencePattern::Day,
            RecurrenceType::Week => RecurrencePattern::Week {
                days: self.recurrence_repeats_on.filter(|days| !days.is_empty()),
            },
            RecurrenceType::Month => RecurrencePattern::Month {
                repeats_on: MonthlyRepeatsOn::from_wire(self.recurrence_monthly_repeats_on),
            },
            RecurrenceType::Year => RecurrencePattern::Year,
            RecurrenceType::None => return None,
        };
        Some(RecurrenceRule {
            pattern,
            interval,
            until: self.recurrence_range,
        })
    }

    /// URL of the event's own edit button, when the source supplied one.
    #[must_use]
    pub fn edit_button_url(&self) -> Option<&str> {
        self.buttons
            .iter()
            .find(|button| button.id.as_deref() == Some(EDIT_BUTTON_ID))
            .and_then(|button| button.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Recurrence cadence with unit-specific options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePattern {
    Minute,
    Hour,
    Day,
    /// `days == None` steps whole weeks from the original start.
    Week { days: Option<WeekdaySet> },
    Month { repeats_on: MonthlyRepeatsOn },
    Year,
}

impl RecurrencePattern {
    #[must_use]
    pub const fn kind(self) -> RecurrenceType {
        match self {
            Self::Minute => RecurrenceType::Minute,
            Self::Hour => RecurrenceType::Hour,
            Self::Day => RecurrenceType::Day,
            Self::Week { .. } => RecurrenceType::Week,
            Self::Month { .. } => RecurrenceType::Month,
            Self::Year => RecurrenceType::Year,
        }
    }
}

/// A validated recurrence definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    /// Always positive.
    pub interval: u32,
    /// Epoch seconds; no occurrence starts at or after it.
    pub until: Option<i64>,
}

impl RecurrenceRule {
    /// Step length for cadences measured in absolute time.
    #[must_use]
    pub fn fixed_step_secs(&self) -> Option<i64> {
        let unit = match self.pattern {
            RecurrencePattern::Minute => 60,
            RecurrencePattern::Hour => 3_600,
            _ => return None,
        };
        Some(i64::from(self.interval) * unit)
    }

    /// ## Summary
    /// Whether the cadence repeats more than once a day.
    ///
    /// Minute intervals below 1440 and hour intervals below 24 qualify.
    #[must_use]
    pub const fn is_high_frequency(&self) -> bool {
        match self.pattern {
            RecurrencePattern::Minute => self.interval < 1_440,
            RecurrencePattern::Hour => self.interval < 24,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_requires_flag_unit_and_positive_interval() {
        let base = ScheduleEvent::new(1, 1_000, 1_600);
        assert!(base.recurrence().is_none());

        let zero = base.clone().repeating(RecurrenceType::Day, 0);
        assert!(zero.recurrence().is_none());

        let negative = base.clone().repeating(RecurrenceType::Day, -2);
        assert!(negative.recurrence().is_none());

        let mut missing = base.clone().repeating(RecurrenceType::Day, 1);
        missing.recurrence_detail = None;
        assert!(missing.recurrence().is_none());

        let mut unflagged = base.clone().repeating(RecurrenceType::Day, 1);
        unflagged.recurring_event = false;
        assert!(unflagged.recurrence().is_none());

        let no_unit = base.clone().repeating(RecurrenceType::None, 3);
        assert!(no_unit.recurrence().is_none());

        let rule = base
            .repeating(RecurrenceType::Day, 3)
            .until(9_000)
            .recurrence()
            .expect("valid rule");
        assert_eq!(rule.pattern, RecurrencePattern::Day);
        assert_eq!(rule.interval, 3);
        assert_eq!(rule.until, Some(9_000));
    }

    #[test]
    fn high_frequency_thresholds() {
        let rule = |kind, interval| {
            ScheduleEvent::new(1, 0, 60)
                .repeating(kind, interval)
                .recurrence()
                .expect("valid rule")
        };
        assert!(rule(RecurrenceType::Minute, 1_439).is_high_frequency());
        assert!(!rule(RecurrenceType::Minute, 1_440).is_high_frequency());
        assert!(rule(RecurrenceType::Hour, 23).is_high_frequency());
        assert!(!rule(RecurrenceType::Hour, 24).is_high_frequency());
        assert!(!rule(RecurrenceType::Day, 1).is_high_frequency());
        assert_eq!(rule(RecurrenceType::Hour, 2).fixed_step_secs(), Some(7_200));
        assert_eq!(rule(RecurrenceType::Week, 2).fixed_step_secs(), None);
    }

    #[test]
    fn weekday_set_ignores_out_of_range_numbers() {
        let set = WeekdaySet::from_iso_numbers([0, 1, 3, 5, 8]).expect("non-empty");
        assert_eq!(set.len(), 3);
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Wed));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Sun));
        assert_eq!(set.to_string(), "1,3,5");
        assert!(WeekdaySet::from_iso_numbers([0, 9]).is_none());
    }

    #[test]
    fn recurrence_type_parses_case_insensitively() {
        assert_eq!("month".parse::<RecurrenceType>().ok(), Some(RecurrenceType::Month));
        assert_eq!(" Week ".parse::<RecurrenceType>().ok(), Some(RecurrenceType::Week));
        assert_eq!("".parse::<RecurrenceType>().ok(), Some(RecurrenceType::None));
        assert!("Fortnight".parse::<RecurrenceType>().is_err());
    }

    #[test]
    fn edit_button_url_needs_matching_id() {
        let mut event = ScheduleEvent::new(7, 0, 60);
        event.buttons.push(EventButton {
            id: Some("schedule_button_delete".to_string()),
            url: Some("/schedule/form/delete/7".to_string()),
            text: None,
        });
        assert_eq!(event.edit_button_url(), None);

        event.buttons.push(EventButton {
            id: Some(EDIT_BUTTON_ID.to_string()),
            url: Some("/schedule/form/edit/7?occurrence=1".to_string()),
            text: Some("Edit".to_string()),
        });
        assert_eq!(
            event.edit_button_url(),
            Some("/schedule/form/edit/7?occurrence=1")
        );
    }
}
