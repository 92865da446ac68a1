//! Interval overlap tests.
//!
//! Two tests live here and they disagree on touching intervals:
//!
//! - [`blocks_slot`] is the read-time test used when offering slots. Boundaries
//!   are inclusive, so a slot that ends exactly when a booking starts is
//!   blocked.
//! - [`overlaps`] is the write-time test the appointment store enforces.
//!   Intervals are half-open, so back-to-back appointments are allowed.
//!
//! [`BookingBoundary`] lets the read-time test use either rule.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::appointment::{Appointment, BookedInterval};
use crate::error::ClinicError;
use crate::ids::AppointmentId;

/// How a booked interval's boundaries are treated when offering slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingBoundary {
    /// A slot touching a booking at either end is blocked ([`blocks_slot`]).
    #[default]
    Inclusive,
    /// Only a real overlap blocks a slot ([`overlaps`]); back-to-back slots
    /// are offered.
    HalfOpen,
}

impl BookingBoundary {
    pub fn blocks(self, start: DateTime<Utc>, end: DateTime<Utc>, booked: &BookedInterval) -> bool {
        match self {
            BookingBoundary::Inclusive => blocks_slot(start, end, booked),
            BookingBoundary::HalfOpen => overlaps(start, end, booked.start, booked.end),
        }
    }
}

impl FromStr for BookingBoundary {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inclusive" => Ok(BookingBoundary::Inclusive),
            "half_open" | "half-open" => Ok(BookingBoundary::HalfOpen),
            other => Err(ClinicError::Config(format!(
                "unknown booking boundary '{}' (expected inclusive or half_open)",
                other
            ))),
        }
    }
}

/// An existing appointment that collides with a proposed interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub appointment_id: AppointmentId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub overlap_minutes: i64,
}

/// Whether a booked interval rules out the candidate slot `[start, end)`.
///
/// The slot is blocked if its start or its end falls within
/// `[booked.start, booked.end]` (both ends inclusive), if the booking covers
/// the slot entirely, or if the booking sits entirely inside the slot.
pub fn blocks_slot(start: DateTime<Utc>, end: DateTime<Utc>, booked: &BookedInterval) -> bool {
    let within = |t: DateTime<Utc>| booked.start <= t && t <= booked.end;
    within(start)
        || within(end)
        || (booked.start <= start && booked.end >= end)
        || (start <= booked.start && booked.end <= end)
}

/// Half-open overlap: `a.start < b.end && b.start < a.end`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Every occupying appointment that overlaps `[start, end)`.
///
/// Non-occupying appointments (cancelled, completed, ...) never conflict.
/// Adjacent appointments are not conflicts.
pub fn find_conflicts<'a>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    appointments: impl IntoIterator<Item = &'a Appointment>,
) -> Vec<Conflict> {
    appointments
        .into_iter()
        .filter(|a| a.is_occupying() && overlaps(start, end, a.start, a.end))
        .map(|a| {
            let overlap_start = start.max(a.start);
            let overlap_end = end.min(a.end);
            Conflict {
                appointment_id: a.id,
                start: a.start,
                end: a.end,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}
