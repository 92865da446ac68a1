//! DST transition policies for wall-clock schedule boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ClinicError;

/// Longest DST gap we search across. Real-world gaps are 30 or 60 minutes.
const MAX_GAP_MINUTES: i64 = 180;

/// Policy for schedule boundaries that fall inside a DST gap.
///
/// Ambiguous local times (the repeated hour when clocks fall back) always
/// resolve to the earlier instant, regardless of policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Treat the boundary as unresolvable; the rule yields no slots that day.
    Skip,
    /// Move to the first valid local time after the gap.
    ShiftForward,
    /// Keep the UTC offset in effect before the gap (02:30 becomes 03:30 on
    /// a spring-forward night).
    #[default]
    WallClock,
}

impl FromStr for DstPolicy {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(DstPolicy::Skip),
            "shift_forward" | "shift-forward" => Ok(DstPolicy::ShiftForward),
            "wall_clock" | "wall-clock" => Ok(DstPolicy::WallClock),
            other => Err(ClinicError::Config(format!(
                "unknown DST policy '{}' (expected skip, shift_forward or wall_clock)",
                other
            ))),
        }
    }
}

impl fmt::Display for DstPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DstPolicy::Skip => "skip",
            DstPolicy::ShiftForward => "shift_forward",
            DstPolicy::WallClock => "wall_clock",
        };
        f.write_str(name)
    }
}

/// Resolve a local wall-clock datetime in `tz` to an absolute instant.
///
/// Returns `None` only for a time inside a DST gap under [`DstPolicy::Skip`].
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }

    match policy {
        DstPolicy::Skip => None,
        DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES)
            .find_map(|m| {
                tz.from_local_datetime(&(naive + Duration::minutes(m)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc)),
        DstPolicy::WallClock => {
            let before = tz
                .from_local_datetime(&(naive - Duration::minutes(MAX_GAP_MINUTES)))
                .earliest()?;
            let offset_secs = before.offset().fix().local_minus_utc() as i64;
            Some((naive - Duration::seconds(offset_secs)).and_utc())
        }
    }
}
