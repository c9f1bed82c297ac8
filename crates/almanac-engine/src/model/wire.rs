//! Lenient decoding of schedule event payloads.
//!
//! The event source is loosely typed: integers arrive as numbers or numeric
//! strings, flags as booleans or `0`/`1`, weekday sets as `"1,3,5"` or arrays.
//! Values that cannot be interpreted degrade to "absent" rather than failing
//! the record, except for the identifying fields (`eventId`, `fromDt`, `toDt`).

use serde::de::{DeserializeOwned, Error as _, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::event::{RecurrenceType, ScheduleEvent, WeekdaySet};
use crate::error::EngineResult;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Loose>),
    // Objects and any other shape; reads as absent.
    Other(IgnoredAny),
}

impl Loose {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) => float_to_integer(*value),
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_integer))
            }
            Self::Bool(_) | Self::List(_) | Self::Other(_) => None,
        }
    }

    fn as_flag(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed.eq_ignore_ascii_case("true")
                    || trimmed.parse::<i64>().is_ok_and(|value| value != 0)
            }
            other => other.as_integer().is_some_and(|value| value != 0),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "value is integral and range-checked before the cast"
)]
fn float_to_integer(value: f64) -> Option<i64> {
    let in_range = value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value <= i64::MAX as f64;
    in_range.then(|| value as i64)
}

/// Required integer field (`eventId`, `fromDt`, `toDt`).
pub(crate) fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let loose = Loose::deserialize(deserializer)?;
    loose
        .as_integer()
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {loose:?}")))
}

pub(crate) fn optional_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.and_then(|loose| loose.as_integer()))
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.is_some_and(|loose| loose.as_flag()))
}

pub(crate) fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(
        match Option::<Loose>::deserialize(deserializer)? {
            Some(Loose::Text(text)) => Some(text),
            Some(Loose::Int(value)) => Some(value.to_string()),
            Some(Loose::Float(value)) => Some(value.to_string()),
            _ => None,
        },
    )
}

pub(crate) fn recurrence_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<RecurrenceType, D::Error> {
    let Some(Loose::Text(text)) = Option::<Loose>::deserialize(deserializer)? else {
        return Ok(RecurrenceType::None);
    };
    Ok(text.parse().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "Treating unrecognized recurrence type as none");
        RecurrenceType::None
    }))
}

pub(crate) fn weekday_set<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<WeekdaySet>, D::Error> {
    let numbers: Vec<i64> = match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(text)) => text
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect(),
        Some(Loose::List(items)) => items.iter().filter_map(Loose::as_integer).collect(),
        Some(single) => single.as_integer().into_iter().collect(),
        None => Vec::new(),
    };
    Ok(WeekdaySet::from_iso_numbers(numbers))
}

/// Sequence field where `null` means empty and malformed entries are dropped.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// ## Summary
/// Decodes already-parsed JSON records, skipping the ones that are not events.
///
/// A malformed record never prevents the remaining records from decoding.
#[must_use]
pub fn decode_events(records: Vec<Value>) -> Vec<ScheduleEvent> {
    let total = records.len();
    let events: Vec<ScheduleEvent> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(index, error = %err, "Skipping malformed schedule event");
                None
            }
        })
        .collect();
    tracing::debug!(total, decoded = events.len(), "Decoded schedule events");
    events
}

/// ## Summary
/// Decodes a JSON array body into schedule events.
///
/// ## Errors
/// Returns `EngineError::Decode` if the body is not a JSON array.
pub fn decode_event_array(body: &[u8]) -> EngineResult<Vec<ScheduleEvent>> {
    let records: Vec<Value> = serde_json::from_slice(body)?;
    Ok(decode_events(records))
}
