//! Weekly recurring availability rules.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, Result};
use crate::ids::{BranchId, ProfileId};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A recurring availability window: one weekday, one wall-clock range,
/// tiled into slots of a fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScheduleRule {
    /// 0 = Sunday … 6 = Saturday.
    pub day_of_week: u8,
    #[serde(with = "wall_time")]
    pub start_time: NaiveTime,
    #[serde(with = "wall_time")]
    pub end_time: NaiveTime,
    /// `None` falls back to the caller's default slot length.
    #[serde(default)]
    pub slot_duration_minutes: Option<u32>,
}

impl WeeklyScheduleRule {
    pub fn new(
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
        slot_duration_minutes: Option<u32>,
    ) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
            slot_duration_minutes,
        }
    }

    /// Build a rule from `"HH:MM"` / `"HH:MM:SS"` strings.
    ///
    /// # Errors
    /// Returns `ClinicError::InvalidTime` if either time does not parse.
    pub fn parse(
        day_of_week: u8,
        start_time: &str,
        end_time: &str,
        slot_duration_minutes: Option<u32>,
    ) -> Result<Self> {
        Ok(Self::new(
            day_of_week,
            parse_wall_time(start_time)?,
            parse_wall_time(end_time)?,
            slot_duration_minutes,
        ))
    }

    /// Slot length for this rule, or `fallback` when the row has none.
    pub fn effective_duration(&self, fallback_minutes: u32) -> u32 {
        self.slot_duration_minutes.unwrap_or(fallback_minutes)
    }

    /// Reject rows that must never be stored: weekday out of range, an empty
    /// or reversed window, or a zero slot length.
    pub fn validate(&self) -> Result<()> {
        if self.day_of_week > 6 {
            return Err(ClinicError::InvalidRule(format!(
                "day_of_week must be 0 (Sunday) to 6 (Saturday), got {}",
                self.day_of_week
            )));
        }
        if self.start_time >= self.end_time {
            return Err(ClinicError::InvalidRule(format!(
                "start time {} must be before end time {}",
                self.start_time.format("%H:%M"),
                self.end_time.format("%H:%M")
            )));
        }
        if self.slot_duration_minutes == Some(0) {
            return Err(ClinicError::InvalidRule(
                "slot duration must be a positive number of minutes".to_string(),
            ));
        }
        Ok(())
    }
}

/// A stored schedule row: a rule owned by one doctor at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub doctor_id: ProfileId,
    pub branch_id: BranchId,
    #[serde(flatten)]
    pub rule: WeeklyScheduleRule,
}

/// Short English weekday name for a 0 = Sunday index.
pub fn day_name(day_of_week: u8) -> Option<&'static str> {
    DAY_NAMES.get(day_of_week as usize).copied()
}

/// Parse `"HH:MM"` or `"HH:MM:SS"`.
pub fn parse_wall_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| ClinicError::InvalidTime(format!("expected HH:MM or HH:MM:SS, got '{}'", s)))
}

/// Serde adapter for wall-clock times: reads `"HH:MM"` or `"HH:MM:SS"`,
/// writes `"HH:MM"` unless seconds are set.
mod wall_time {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wall_time(&raw).map_err(serde::de::Error::custom)
    }
}
