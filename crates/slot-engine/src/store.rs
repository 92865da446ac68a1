//! Storage seam for schedules and appointments.
//!
//! The traits are the narrow interface the booking workflow reads and writes
//! through. The in-memory implementations hold each collection behind a single
//! `RwLock`, so an appointment's conflict check and its insert happen under
//! the same write lock and two overlapping bookings can never both land.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::appointment::{
    Appointment, AppointmentFilter, AppointmentStatus, BookedInterval, NewAppointment,
};
use crate::conflict::{find_conflicts, overlaps};
use crate::error::{ClinicError, Result};
use crate::ids::{AppointmentId, BranchId, ProfileId};
use crate::schedule::DoctorSchedule;

pub trait ScheduleStore {
    /// Every rule row for `doctor`, optionally limited to one branch.
    /// Never paginated.
    fn rules_for(&self, doctor: ProfileId, branch: Option<BranchId>) -> Result<Vec<DoctorSchedule>>;

    /// Atomically discard all of `doctor`'s rows and store `rows` instead.
    fn replace_rules(&self, doctor: ProfileId, rows: Vec<DoctorSchedule>) -> Result<()>;
}

pub trait AppointmentStore {
    /// Occupying intervals for `doctor` that overlap `[from, until)`.
    fn booked_between(
        &self,
        doctor: ProfileId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<BookedInterval>>;

    /// Write a new `Scheduled` appointment.
    ///
    /// # Errors
    /// `ClinicError::Conflict` if it overlaps another occupying appointment of
    /// the same doctor.
    fn insert(&self, appointment: NewAppointment) -> Result<Appointment>;

    fn get(&self, id: AppointmentId) -> Result<Appointment>;

    /// Change status. Moving back to an occupying status re-checks overlaps.
    fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<Appointment>;

    fn update_clinical(
        &self,
        id: AppointmentId,
        diagnosis: Option<String>,
        progress: Option<String>,
    ) -> Result<Appointment>;

    /// Matching appointments ordered by start time.
    fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>>;
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| ClinicError::Store(format!("{} lock poisoned", name)))
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, name: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| ClinicError::Store(format!("{} lock poisoned", name)))
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    rows: RwLock<Vec<DoctorSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<DoctorSchedule>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// A copy of every stored row.
    pub fn all(&self) -> Result<Vec<DoctorSchedule>> {
        Ok(read_lock(&self.rows, "schedule store")?.clone())
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn rules_for(&self, doctor: ProfileId, branch: Option<BranchId>) -> Result<Vec<DoctorSchedule>> {
        let rows = read_lock(&self.rows, "schedule store")?;
        Ok(rows
            .iter()
            .filter(|row| row.doctor_id == doctor && branch.is_none_or(|b| row.branch_id == b))
            .cloned()
            .collect())
    }

    fn replace_rules(&self, doctor: ProfileId, rows: Vec<DoctorSchedule>) -> Result<()> {
        if let Some(foreign) = rows.iter().find(|row| row.doctor_id != doctor) {
            return Err(ClinicError::InvalidRule(format!(
                "row for doctor {} in a schedule replace for doctor {}",
                foreign.doctor_id, doctor
            )));
        }

        let mut stored = write_lock(&self.rows, "schedule store")?;
        let before = stored.len();
        stored.retain(|row| row.doctor_id != doctor);
        let removed = before - stored.len();
        let added = rows.len();
        stored.extend(rows);

        debug!(%doctor, removed, added, "replaced doctor schedule");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    rows: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows. Rows are trusted as-is; no overlap check.
    pub fn from_rows(rows: Vec<Appointment>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub fn all(&self) -> Result<Vec<Appointment>> {
        Ok(read_lock(&self.rows, "appointment store")?.clone())
    }

    fn modify<F>(&self, id: AppointmentId, f: F) -> Result<Appointment>
    where
        F: FnOnce(&[Appointment], &mut Appointment) -> Result<()>,
    {
        let mut rows = write_lock(&self.rows, "appointment store")?;
        let index = rows
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {}", id)))?;

        let mut updated = rows[index].clone();
        f(rows.as_slice(), &mut updated)?;
        rows[index] = updated.clone();
        Ok(updated)
    }
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn booked_between(
        &self,
        doctor: ProfileId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<BookedInterval>> {
        let rows = read_lock(&self.rows, "appointment store")?;
        Ok(rows
            .iter()
            .filter(|a| a.doctor_id == doctor && a.is_occupying())
            .filter(|a| overlaps(a.start, a.end, from, until))
            .map(Appointment::interval)
            .collect())
    }

    fn insert(&self, appointment: NewAppointment) -> Result<Appointment> {
        if appointment.end <= appointment.start {
            return Err(ClinicError::InvalidTime(format!(
                "appointment end {} is not after start {}",
                appointment.end, appointment.start
            )));
        }

        let mut rows = write_lock(&self.rows, "appointment store")?;
        let conflicts = find_conflicts(
            appointment.start,
            appointment.end,
            rows.iter().filter(|a| a.doctor_id == appointment.doctor_id),
        );
        if !conflicts.is_empty() {
            warn!(
                doctor = %appointment.doctor_id,
                start = %appointment.start,
                conflicts = conflicts.len(),
                "rejected overlapping appointment"
            );
            return Err(ClinicError::Conflict { conflicts });
        }

        let stored = appointment.into_appointment(AppointmentId::new());
        debug!(id = %stored.id, doctor = %stored.doctor_id, start = %stored.start, "appointment booked");
        rows.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: AppointmentId) -> Result<Appointment> {
        read_lock(&self.rows, "appointment store")?
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {}", id)))
    }

    fn update_status(&self, id: AppointmentId, status: AppointmentStatus) -> Result<Appointment> {
        self.modify(id, |rows, appointment| {
            if status.is_occupying() && !appointment.is_occupying() {
                let conflicts = find_conflicts(
                    appointment.start,
                    appointment.end,
                    rows.iter()
                        .filter(|a| a.doctor_id == appointment.doctor_id && a.id != id),
                );
                if !conflicts.is_empty() {
                    return Err(ClinicError::Conflict { conflicts });
                }
            }
            appointment.status = status;
            Ok(())
        })
    }

    fn update_clinical(
        &self,
        id: AppointmentId,
        diagnosis: Option<String>,
        progress: Option<String>,
    ) -> Result<Appointment> {
        self.modify(id, |_, appointment| {
            appointment.diagnosis = diagnosis;
            appointment.progress = progress;
            Ok(())
        })
    }

    fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let rows = read_lock(&self.rows, "appointment store")?;
        let mut matched: Vec<Appointment> =
            rows.iter().filter(|a| filter.matches(a)).cloned().collect();
        matched.sort_by_key(|a| a.start);
        Ok(matched)
    }
}
