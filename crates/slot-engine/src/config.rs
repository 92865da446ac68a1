//! Engine configuration.
//!
//! ## Environment Variables
//!
//! - `CLINIC_TIMEZONE`: IANA timezone of the clinic's wall clock (default: "UTC")
//! - `CLINIC_DEFAULT_SLOT_MINUTES`: slot length for rules without one (default: 30)
//! - `CLINIC_DST_POLICY`: `skip`, `shift_forward` or `wall_clock` (default: "wall_clock")
//! - `CLINIC_BOOKING_BOUNDARY`: `inclusive` or `half_open` (default: "inclusive")

use std::env;

use chrono_tz::Tz;

use crate::clock::ClinicClock;
use crate::conflict::BookingBoundary;
use crate::dst::DstPolicy;
use crate::error::{ClinicError, Result};

pub const DEFAULT_SLOT_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub timezone: Tz,
    pub fallback_slot_minutes: u32,
    pub dst_policy: DstPolicy,
    pub boundary: BookingBoundary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            fallback_slot_minutes: DEFAULT_SLOT_MINUTES,
            dst_policy: DstPolicy::default(),
            boundary: BookingBoundary::default(),
        }
    }
}

impl EngineConfig {
    /// Load from the process environment, defaulting unset variables.
    ///
    /// # Errors
    /// Returns `ClinicError::Config` / `ClinicError::InvalidTimezone` for a
    /// variable that is set but invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tz) = lookup("CLINIC_TIMEZONE") {
            config.timezone = tz
                .trim()
                .parse()
                .map_err(|_| ClinicError::InvalidTimezone(tz.clone()))?;
        }

        if let Some(minutes) = lookup("CLINIC_DEFAULT_SLOT_MINUTES") {
            config.fallback_slot_minutes = parse_slot_minutes(&minutes)?;
        }

        if let Some(policy) = lookup("CLINIC_DST_POLICY") {
            config.dst_policy = policy.parse()?;
        }

        if let Some(boundary) = lookup("CLINIC_BOOKING_BOUNDARY") {
            config.boundary = boundary.parse()?;
        }

        Ok(config)
    }

    pub fn clock(&self) -> ClinicClock {
        ClinicClock::new(self.timezone, self.dst_policy)
    }
}

/// Parse a positive slot length in minutes.
pub fn parse_slot_minutes(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(ClinicError::Config(format!(
            "slot minutes must be a positive integer, got '{}'",
            raw
        ))),
        Ok(minutes) => Ok(minutes),
    }
}
