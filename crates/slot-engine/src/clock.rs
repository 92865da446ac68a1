//! The clinic's local wall clock.
//!
//! Schedules are written in local wall-clock time and dates are civil dates in
//! the clinic's timezone. Slots and appointments are absolute `DateTime<Utc>`
//! instants. [`ClinicClock`] converts between the two.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{ClinicError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicClock {
    pub timezone: Tz,
    pub dst_policy: DstPolicy,
}

impl Default for ClinicClock {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl ClinicClock {
    pub fn new(timezone: Tz, dst_policy: DstPolicy) -> Self {
        Self {
            timezone,
            dst_policy,
        }
    }

    /// Build a clock from an IANA timezone name (e.g. "Europe/Berlin").
    ///
    /// # Errors
    /// Returns `ClinicError::InvalidTimezone` if the name is not a known IANA identifier.
    pub fn from_name(timezone: &str, dst_policy: DstPolicy) -> Result<Self> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| ClinicError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self::new(tz, dst_policy))
    }

    /// Day-of-week index of a civil date: 0 = Sunday … 6 = Saturday.
    pub fn weekday_index(date: NaiveDate) -> u8 {
        date.weekday().num_days_from_sunday() as u8
    }

    /// The absolute instant of `time` on `date` in the clinic's wall clock.
    ///
    /// `None` when the local time falls in a DST gap and the policy is
    /// [`DstPolicy::Skip`].
    pub fn instant_at(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        resolve_local(&self.timezone, date.and_time(time), self.dst_policy)
    }

    /// `[local midnight, next local midnight)` of `date`, as UTC instants.
    ///
    /// Midnight itself can fall inside a DST gap in a few zones, so the bounds
    /// always shift forward out of a gap rather than follow the clock policy.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = date.succ_opt().unwrap_or(date);
        (self.midnight(date), self.midnight(next))
    }

    /// The civil date of an instant in the clinic's timezone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }

    /// `"HH:MM"` of an instant in the clinic's wall clock.
    pub fn wall_label(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format("%H:%M")
            .to_string()
    }

    fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        resolve_local(&self.timezone, naive, DstPolicy::ShiftForward)
            .unwrap_or_else(|| naive.and_utc())
    }
}
