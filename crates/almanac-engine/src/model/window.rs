use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::occurrence::Occurrence;
use crate::error::{EngineError, EngineResult};

/// Visible calendar range `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewWindow {
    start_ms: i64,
    end_ms: i64,
}

impl ViewWindow {
    /// ## Summary
    /// Creates a half-open window.
    ///
    /// ## Errors
    /// Returns `EngineError::InvalidWindow` unless `start_ms < end_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> EngineResult<Self> {
        if start_ms < end_ms {
            Ok(Self { start_ms, end_ms })
        } else {
            Err(EngineError::InvalidWindow { start_ms, end_ms })
        }
    }

    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Strict on both ends: touching a boundary without overlapping is excluded.
    #[must_use]
    pub const fn intersects(&self, occurrence: &Occurrence<'_>) -> bool {
        occurrence.start_ms() < self.end_ms && occurrence.end_ms() > self.start_ms
    }
}

/// Resolution the host calendar is rendering at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

impl Granularity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Agenda => "agenda",
        }
    }

    /// Month cells are too coarse to show sub-daily repeats individually.
    #[must_use]
    pub const fn collapses_high_frequency(self) -> bool {
        matches!(self, Self::Month)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        [Self::Month, Self::Week, Self::Day, Self::Agenda]
            .into_iter()
            .find(|granularity| granularity.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EngineError::UnknownGranularity(trimmed.to_string()))
    }
}
