//! Folding of same-day occurrences of one event.

use std::collections::HashMap;
use std::iter;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::EngineResult;
use crate::expand::calendar::calendar_day;
use crate::model::Occurrence;

/// Composite identity of a rendered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub event_id: i64,
    pub day: NaiveDate,
}

/// Occurrences of one event starting on one local day, in generation order.
#[derive(Debug, Clone)]
pub struct DayGroup<'e> {
    pub key: DayKey,
    /// The member that gets rendered.
    pub first: Occurrence<'e>,
    pub rest: Vec<Occurrence<'e>>,
}

impl<'e> DayGroup<'e> {
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn members(&self) -> impl Iterator<Item = &Occurrence<'e>> {
        iter::once(&self.first).chain(&self.rest)
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.members().any(|member| member.is_high_frequency)
    }
}

/// Groups occurrences by `(event id, local start day)`.
///
/// Groups come out in the order their first member was inserted.
#[derive(Debug)]
pub struct DayGrouper<'e> {
    timezone: Tz,
    index: HashMap<DayKey, usize>,
    groups: Vec<DayGroup<'e>>,
}

impl<'e> DayGrouper<'e> {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// ## Summary
    /// Adds an occurrence to its day group.
    ///
    /// ## Errors
    /// Returns `EngineError::TimestampOutOfRange` if the start has no calendar day.
    pub fn insert(&mut self, occurrence: Occurrence<'e>) -> EngineResult<()> {
        let key = DayKey {
            event_id: occurrence.event.event_id,
            day: calendar_day(self.timezone, occurrence.from_dt)?,
        };
        match self.index.get(&key) {
            Some(&position) => self.groups[position].rest.push(occurrence),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(DayGroup {
                    key,
                    first: occurrence,
                    rest: Vec::new(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn into_groups(self) -> Vec<DayGroup<'e>> {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::Asia::Tokyo;

    use super::*;
    use crate::model::ScheduleEvent;

    // 2026-01-05 09:00 UTC
    const MORNING: i64 = 1_767_603_600;

    #[test]
    fn groups_by_event_and_day_in_insertion_order() {
        let first = ScheduleEvent::new(1, MORNING, MORNING + 600);
        let second = ScheduleEvent::new(2, MORNING, MORNING + 600);
        let mut grouper = DayGrouper::new(Tz::UTC);

        grouper.insert(Occurrence::defining(&second)).expect("in range");
        grouper.insert(Occurrence::defining(&first)).expect("in range");
        grouper
            .insert(Occurrence::starting_at(&second, MORNING + 3_600))
            .expect("in range");
        grouper
            .insert(Occurrence::starting_at(&second, MORNING + 86_400))
            .expect("in range");

        let groups = grouper.into_groups();
        let shape: Vec<(i64, usize)> = groups
            .iter()
            .map(|group| (group.key.event_id, group.count()))
            .collect();
        assert_eq!(shape, vec![(2, 2), (1, 1), (2, 1)]);
        assert_eq!(groups[0].first.from_dt, MORNING);
    }

    #[test]
    fn day_boundary_follows_timezone() {
        let event = ScheduleEvent::new(1, MORNING, MORNING + 600);
        // 09:00 and 16:00 UTC fall on different days in Tokyo
        let mut utc = DayGrouper::new(Tz::UTC);
        let mut tokyo = DayGrouper::new(Tokyo);
        for grouper in [&mut utc, &mut tokyo] {
            grouper.insert(Occurrence::defining(&event)).expect("in range");
            grouper
                .insert(Occurrence::starting_at(&event, MORNING + 7 * 3_600))
                .expect("in range");
        }
        assert_eq!(utc.len(), 1);
        assert_eq!(tokyo.len(), 2);
    }

    #[test]
    fn collapsed_groups_are_flagged() {
        let event = ScheduleEvent::new(1, MORNING, MORNING + 600);
        let mut grouper = DayGrouper::new(Tz::UTC);
        grouper.insert(Occurrence::defining(&event)).expect("in range");
        grouper.insert(Occurrence::collapsed(&event, MORNING)).expect("in range");
        let groups = grouper.into_groups();
        assert!(groups[0].is_collapsed());
    }
}
