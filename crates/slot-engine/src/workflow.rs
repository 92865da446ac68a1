//! Booking workflow over injected stores.
//!
//! Reads schedule rules and the day's bookings through the store traits,
//! hands them to the slot engine, and writes bookings back. The slot list is a
//! read-time hint: the appointment store has the final word at write time, and
//! a [`ClinicError::Conflict`] from [`BookingWorkflow::book`] means the caller
//! must recompute availability and let the user pick again.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::access::{Capabilities, Capability, Principal};
use crate::appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};
use crate::clock::ClinicClock;
use crate::config::EngineConfig;
use crate::error::{ClinicError, Result};
use crate::ids::{AppointmentId, BranchId, PatientId, ProfileId};
use crate::schedule::{DoctorSchedule, WeeklyScheduleRule};
use crate::slots::{Slot, SlotEngine};
use crate::store::{AppointmentStore, ScheduleStore};

/// What a doctor can offer on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayAvailability {
    /// No rule covers that weekday.
    NoSchedule,
    /// Free slots, possibly none when the day is fully booked.
    Slots(Vec<Slot>),
}

impl DayAvailability {
    pub fn slots(&self) -> &[Slot] {
        match self {
            DayAvailability::NoSchedule => &[],
            DayAvailability::Slots(slots) => slots,
        }
    }

    /// Message to show instead of a slot picker, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DayAvailability::NoSchedule => Some("No schedule set for this day."),
            DayAvailability::Slots(slots) if slots.is_empty() => Some("No available slots."),
            DayAvailability::Slots(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub branch_id: BranchId,
    pub doctor_id: ProfileId,
    pub patient_id: PatientId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn for_slot(
        branch_id: BranchId,
        doctor_id: ProfileId,
        patient_id: PatientId,
        slot: &Slot,
    ) -> Self {
        Self {
            branch_id,
            doctor_id,
            patient_id,
            start: slot.start,
            end: slot.end,
            notes: None,
        }
    }
}

pub struct BookingWorkflow<'a, S, A> {
    schedules: &'a S,
    appointments: &'a A,
    config: EngineConfig,
}

impl<'a, S, A> BookingWorkflow<'a, S, A>
where
    S: ScheduleStore,
    A: AppointmentStore,
{
    pub fn new(schedules: &'a S, appointments: &'a A, config: EngineConfig) -> Self {
        Self {
            schedules,
            appointments,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bookable slots for `doctor` on `date`, optionally only from rules at
    /// `branch`. Bookings at any branch block the doctor's time.
    pub fn availability(
        &self,
        doctor: ProfileId,
        branch: Option<BranchId>,
        date: NaiveDate,
    ) -> Result<DayAvailability> {
        let rules: Vec<WeeklyScheduleRule> = self
            .schedules
            .rules_for(doctor, branch)?
            .into_iter()
            .map(|row| row.rule)
            .collect();

        let weekday = ClinicClock::weekday_index(date);
        if !rules.iter().any(|rule| rule.day_of_week == weekday) {
            debug!(%doctor, %date, "no schedule for weekday");
            return Ok(DayAvailability::NoSchedule);
        }

        let engine = SlotEngine::from(&self.config);
        let (day_start, day_end) = engine.clock.day_bounds(date);
        let booked = self.appointments.booked_between(doctor, day_start, day_end)?;

        Ok(DayAvailability::Slots(engine.compute(date, &rules, &booked)))
    }

    /// Book an appointment as `principal`.
    ///
    /// # Errors
    /// - `ClinicError::Forbidden` if the principal cannot book in the branch.
    /// - `ClinicError::InvalidTime` if the interval is empty or reversed.
    /// - `ClinicError::Conflict` if the interval was taken in the meantime.
    pub fn book(&self, principal: &Principal, request: BookingRequest) -> Result<Appointment> {
        let caps = Capabilities::for_principal(principal);
        caps.require(
            caps.can_manage_appointments_in(request.branch_id),
            "book appointments in this branch",
        )?;

        if request.end <= request.start {
            return Err(ClinicError::InvalidTime(
                "appointment must end after it starts".to_string(),
            ));
        }

        let appointment = self.appointments.insert(NewAppointment {
            branch_id: request.branch_id,
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            start: request.start,
            end: request.end,
            notes: non_blank(request.notes.as_deref()),
            created_by: principal.id,
        })?;

        info!(
            id = %appointment.id,
            doctor = %appointment.doctor_id,
            start = %appointment.start,
            "appointment created"
        );
        Ok(appointment)
    }

    pub fn update_status(
        &self,
        principal: &Principal,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let caps = Capabilities::for_principal(principal);
        let current = self.appointments.get(id)?;
        caps.require(
            caps.can_manage_appointments_in(current.branch_id),
            "change appointment status",
        )?;
        self.appointments.update_status(id, status)
    }

    /// Set diagnosis and progress notes. Blank text clears a field.
    pub fn record_clinical_notes(
        &self,
        principal: &Principal,
        id: AppointmentId,
        diagnosis: Option<&str>,
        progress: Option<&str>,
    ) -> Result<Appointment> {
        let caps = Capabilities::for_principal(principal);
        let current = self.appointments.get(id)?;
        caps.require(
            caps.can_edit_clinical_notes(current.branch_id),
            "edit clinical notes",
        )?;
        self.appointments
            .update_clinical(id, non_blank(diagnosis), non_blank(progress))
    }

    /// Replace `doctor`'s whole weekly schedule with `rows`.
    ///
    /// The principal must be allowed to manage the schedule at every branch
    /// touched, both the new rows and the rows being discarded.
    pub fn replace_schedule(
        &self,
        principal: &Principal,
        doctor: ProfileId,
        rows: Vec<DoctorSchedule>,
    ) -> Result<()> {
        let caps = Capabilities::for_principal(principal);
        let existing = self.schedules.rules_for(doctor, None)?;

        for row in existing.iter().chain(rows.iter()) {
            caps.require(
                caps.can_manage_schedule(doctor, row.branch_id),
                "edit this doctor's schedule",
            )?;
        }
        for row in &rows {
            if row.doctor_id != doctor {
                return Err(ClinicError::InvalidRule(format!(
                    "row belongs to doctor {}, not {}",
                    row.doctor_id, doctor
                )));
            }
            row.rule.validate()?;
        }

        self.schedules.replace_rules(doctor, rows)
    }

    /// Appointments visible to `principal`. Staff without the all-branches
    /// capability only see their own branch.
    pub fn appointments(
        &self,
        principal: &Principal,
        filter: AppointmentFilter,
    ) -> Result<Vec<Appointment>> {
        let caps = Capabilities::for_principal(principal);
        let mut filter = filter;

        if !caps.has(Capability::ViewAllBranches) {
            let home = principal.branch_id.ok_or_else(|| {
                ClinicError::Forbidden(format!("{} has no branch", principal.id))
            })?;
            if let Some(requested) = filter.branch_id {
                caps.require(caps.can_view_branch(requested), "view another branch")?;
            }
            filter.branch_id = Some(home);
        }

        self.appointments.list(&filter)
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
