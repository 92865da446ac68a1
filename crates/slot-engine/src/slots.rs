//! Bookable slot computation.
//!
//! Tiles each matching weekly rule into fixed-length slots on one civil date,
//! drops every slot a booked interval blocks, and returns the survivors sorted
//! by start time. Pure: no I/O, no shared state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::appointment::BookedInterval;
use crate::clock::ClinicClock;
use crate::config::{EngineConfig, DEFAULT_SLOT_MINUTES};
use crate::conflict::BookingBoundary;
use crate::schedule::WeeklyScheduleRule;

/// A bookable time interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `"HH:MM–HH:MM"` in the clinic's wall clock. Display only.
    pub label: String,
}

impl Slot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Slot computation settings. Stateless; `compute` can be called from any
/// number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEngine {
    pub clock: ClinicClock,
    pub boundary: BookingBoundary,
    /// Slot length for rules that do not carry one.
    pub fallback_slot_minutes: u32,
}

impl Default for SlotEngine {
    fn default() -> Self {
        Self {
            clock: ClinicClock::default(),
            boundary: BookingBoundary::default(),
            fallback_slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl From<&EngineConfig> for SlotEngine {
    fn from(config: &EngineConfig) -> Self {
        Self {
            clock: config.clock(),
            boundary: config.boundary,
            fallback_slot_minutes: config.fallback_slot_minutes,
        }
    }
}

impl SlotEngine {
    pub fn new(clock: ClinicClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn with_boundary(mut self, boundary: BookingBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_fallback_minutes(mut self, minutes: u32) -> Self {
        self.fallback_slot_minutes = minutes;
        self
    }

    /// Compute bookable slots for `date` in the clinic's local wall clock.
    ///
    /// Rules for other weekdays are ignored; no matching rule yields an empty
    /// list. Each matching rule is tiled on its own, from its start time in
    /// steps of its slot duration (or the fallback when it has none). A slot
    /// that would run past the rule's end time is dropped, not shortened.
    /// Rules are never merged, so two overlapping rules can yield identical
    /// slots and both are returned.
    ///
    /// # Arguments
    ///
    /// * `date`: Civil date to compute slots for.
    /// * `rules`: All of the doctor's weekly rules (any weekday).
    /// * `booked`: Occupying bookings for the doctor on that day.
    pub fn compute(
        &self,
        date: NaiveDate,
        rules: &[WeeklyScheduleRule],
        booked: &[BookedInterval],
    ) -> Vec<Slot> {
        let weekday = ClinicClock::weekday_index(date);

        let mut slots: Vec<Slot> = rules
            .iter()
            .filter(|rule| rule.day_of_week == weekday)
            .flat_map(|rule| self.tile_rule(date, rule, booked))
            .collect();

        // Stable: equal starts keep rule order.
        slots.sort_by_key(|slot| slot.start);

        debug!(
            %date,
            weekday,
            rules = rules.len(),
            booked = booked.len(),
            slots = slots.len(),
            "computed available slots"
        );

        slots
    }

    fn tile_rule(
        &self,
        date: NaiveDate,
        rule: &WeeklyScheduleRule,
        booked: &[BookedInterval],
    ) -> Vec<Slot> {
        let minutes = rule.effective_duration(self.fallback_slot_minutes);
        if minutes == 0 {
            warn!(?rule, "skipping schedule rule with zero slot duration");
            return Vec::new();
        }
        let step = Duration::minutes(minutes as i64);

        let (Some(mut slot_start), Some(schedule_end)) = (
            self.clock.instant_at(date, rule.start_time),
            self.clock.instant_at(date, rule.end_time),
        ) else {
            debug!(?rule, %date, "schedule boundary falls in a DST gap; rule skipped");
            return Vec::new();
        };

        let mut slots = Vec::new();
        while slot_start < schedule_end {
            let slot_end = slot_start + step;
            if slot_end > schedule_end {
                break;
            }

            if !booked
                .iter()
                .any(|b| self.boundary.blocks(slot_start, slot_end, b))
            {
                slots.push(Slot {
                    start: slot_start,
                    end: slot_end,
                    label: format!(
                        "{}–{}",
                        self.clock.wall_label(slot_start),
                        self.clock.wall_label(slot_end)
                    ),
                });
            }

            slot_start = slot_end;
        }

        slots
    }
}

/// Compute bookable slots for `date` with a UTC clinic clock and inclusive
/// booking boundaries.
///
/// See [`SlotEngine::compute`].
pub fn compute_available_slots(
    date: NaiveDate,
    rules: &[WeeklyScheduleRule],
    booked: &[BookedInterval],
    fallback_slot_minutes: u32,
) -> Vec<Slot> {
    SlotEngine::default()
        .with_fallback_minutes(fallback_slot_minutes)
        .compute(date, rules, booked)
}
