use thiserror::Error;

/// Errors raised while decoding or expanding schedule events.
///
/// None of these reach the pipeline caller: they are logged and the
/// affected event degrades to its defining instance.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Timestamp {0} is outside the supported calendar range")]
    TimestampOutOfRange(i64),

    #[error("Event {event_id} ends before it starts")]
    NegativeDuration { event_id: i64 },

    #[error("Invalid view window: start {start_ms} is not before end {end_ms}")]
    InvalidWindow { start_ms: i64, end_ms: i64 },

    #[error("Unknown recurrence type: {0}")]
    UnknownRecurrenceType(String),

    #[error("Unknown granularity: {0}")]
    UnknownGranularity(String),

    #[error("Malformed event payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
