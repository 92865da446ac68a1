//! JSON snapshot of clinic scheduling data.

use serde::{Deserialize, Serialize};

use crate::appointment::Appointment;
use crate::error::{ClinicError, Result};
use crate::schedule::DoctorSchedule;
use crate::store::{InMemoryAppointmentStore, InMemoryScheduleStore};

/// Schedules and appointments as one serializable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicSnapshot {
    #[serde(default)]
    pub schedules: Vec<DoctorSchedule>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl ClinicSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClinicError::Store(format!("invalid clinic snapshot: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClinicError::Store(format!("failed to serialize snapshot: {}", e)))
    }

    pub fn into_stores(self) -> (InMemoryScheduleStore, InMemoryAppointmentStore) {
        (
            InMemoryScheduleStore::from_rows(self.schedules),
            InMemoryAppointmentStore::from_rows(self.appointments),
        )
    }

    pub fn from_stores(
        schedules: &InMemoryScheduleStore,
        appointments: &InMemoryAppointmentStore,
    ) -> Result<Self> {
        Ok(Self {
            schedules: schedules.all()?,
            appointments: appointments.all()?,
        })
    }
}
