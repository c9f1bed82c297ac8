use super::event::ScheduleEvent;

/// One concrete instance of a schedule event.
///
/// Shares the immutable source record and overrides only the instance
/// bounds and the high-frequency marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub event: &'a ScheduleEvent,
    /// Epoch seconds.
    pub from_dt: i64,
    /// Epoch seconds; always `from_dt + event.duration_secs()`.
    pub to_dt: i64,
    /// Set on representatives synthesized by the high-frequency collapser.
    pub is_high_frequency: bool,
}

impl<'a> Occurrence<'a> {
    /// The event's own instance.
    #[must_use]
    pub const fn defining(event: &'a ScheduleEvent) -> Self {
        Self {
            event,
            from_dt: event.from_dt,
            to_dt: event.to_dt,
            is_high_frequency: false,
        }
    }

    /// A recurrence instance starting at `from_dt`, keeping the source duration.
    #[must_use]
    pub const fn starting_at(event: &'a ScheduleEvent, from_dt: i64) -> Self {
        Self {
            event,
            from_dt,
            to_dt: from_dt.saturating_add(event.duration_secs()),
            is_high_frequency: false,
        }
    }

    /// A collapsed stand-in for a day's worth of sub-daily repeats.
    #[must_use]
    pub const fn collapsed(event: &'a ScheduleEvent, from_dt: i64) -> Self {
        let mut occurrence = Self::starting_at(event, from_dt);
        occurrence.is_high_frequency = true;
        occurrence
    }

    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.from_dt.saturating_mul(1_000)
    }

    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.to_dt.saturating_mul(1_000)
    }
}
