//! Appointments and the intervals they occupy.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClinicError;
use crate::ids::{AppointmentId, BranchId, PatientId, ProfileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
        AppointmentStatus::Rescheduled,
    ];

    /// Whether an appointment in this state holds its time on the calendar.
    /// Only `Scheduled` does.
    pub fn is_occupying(self) -> bool {
        self == AppointmentStatus::Scheduled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }

    /// Human label for display ("No show").
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No show",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ClinicError::Store(format!("unknown appointment status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub branch_id: BranchId,
    pub doctor_id: ProfileId,
    pub patient_id: PatientId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    pub created_by: ProfileId,
}

impl Appointment {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }
}

/// An appointment that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub branch_id: BranchId,
    pub doctor_id: ProfileId,
    pub patient_id: PatientId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: ProfileId,
}

impl NewAppointment {
    /// Assign an id; new appointments always start out `Scheduled`.
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            branch_id: self.branch_id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            start: self.start,
            end: self.end,
            status: AppointmentStatus::Scheduled,
            notes: self.notes,
            diagnosis: None,
            progress: None,
            created_by: self.created_by,
        }
    }
}

/// An already-reserved `[start, end)` range for one doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Listing filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub branch_id: Option<BranchId>,
    pub doctor_id: Option<ProfileId>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.branch_id.is_none_or(|b| appointment.branch_id == b)
            && self.doctor_id.is_none_or(|d| appointment.doctor_id == d)
            && self.status.is_none_or(|s| appointment.status == s)
            && self.from.is_none_or(|from| appointment.start >= from)
            && self.until.is_none_or(|until| appointment.start < until)
    }
}
