//! Tests for the booking workflow over in-memory stores.

use chrono::{NaiveDate, TimeZone, Utc};
use slot_engine::appointment::AppointmentFilter;
use slot_engine::{
    AppointmentStatus, AppointmentStore, BookingRequest, BookingWorkflow, BranchId, ClinicError,
    DayAvailability, DoctorSchedule, EngineConfig, InMemoryAppointmentStore,
    InMemoryScheduleStore, NewAppointment, PatientId, Principal, ProfileId, Role, ScheduleStore,
    WeeklyScheduleRule,
};

struct Clinic {
    schedules: InMemoryScheduleStore,
    appointments: InMemoryAppointmentStore,
    branch: BranchId,
    doctor: Principal,
    receptionist: Principal,
    admin: Principal,
}

impl Clinic {
    /// One branch, one doctor working Mondays 09:00–12:00 in 30-minute slots.
    fn new() -> Self {
        let branch = BranchId::new();
        let doctor = Principal {
            id: ProfileId::new(),
            role: Role::Doctor,
            branch_id: Some(branch),
        };
        let schedules = InMemoryScheduleStore::from_rows(vec![DoctorSchedule {
            doctor_id: doctor.id,
            branch_id: branch,
            rule: WeeklyScheduleRule::parse(1, "09:00", "12:00", Some(30)).unwrap(),
        }]);

        Self {
            schedules,
            appointments: InMemoryAppointmentStore::new(),
            branch,
            receptionist: Principal {
                id: ProfileId::new(),
                role: Role::Receptionist,
                branch_id: Some(branch),
            },
            admin: Principal {
                id: ProfileId::new(),
                role: Role::Admin,
                branch_id: None,
            },
            doctor,
        }
    }

    fn workflow(&self) -> BookingWorkflow<'_, InMemoryScheduleStore, InMemoryAppointmentStore> {
        BookingWorkflow::new(&self.schedules, &self.appointments, EngineConfig::default())
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

#[test]
fn day_without_rules_reports_no_schedule() {
    let clinic = Clinic::new();
    let sunday = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let availability = clinic.workflow().availability(clinic.doctor.id, None, sunday).unwrap();

    assert_eq!(availability, DayAvailability::NoSchedule);
    assert_eq!(availability.message(), Some("No schedule set for this day."));
    assert!(availability.slots().is_empty());
}

#[test]
fn scheduled_day_lists_slots() {
    let clinic = Clinic::new();

    let availability = clinic
        .workflow()
        .availability(clinic.doctor.id, Some(clinic.branch), monday())
        .unwrap();

    assert_eq!(availability.slots().len(), 6);
    assert_eq!(availability.message(), None);
}

#[test]
fn branch_filter_excludes_rules_elsewhere() {
    let clinic = Clinic::new();

    let availability = clinic
        .workflow()
        .availability(clinic.doctor.id, Some(BranchId::new()), monday())
        .unwrap();

    assert_eq!(availability, DayAvailability::NoSchedule);
}

#[test]
fn booking_removes_the_slot_from_availability() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let before = workflow.availability(clinic.doctor.id, None, monday()).unwrap();
    let chosen = before.slots()[0].clone();

    let booked = workflow
        .book(
            &clinic.receptionist,
            BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &chosen),
        )
        .unwrap();

    assert_eq!(booked.created_by, clinic.receptionist.id);
    assert_eq!(booked.status, AppointmentStatus::Scheduled);
    let after = workflow.availability(clinic.doctor.id, None, monday()).unwrap();
    assert!(!after.slots().contains(&chosen));
}

#[test]
fn fully_booked_day_reports_no_available_slots() {
    let clinic = Clinic::new();
    clinic
        .appointments
        .insert(NewAppointment {
            branch_id: clinic.branch,
            doctor_id: clinic.doctor.id,
            patient_id: PatientId::new(),
            start: Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap(),
            notes: None,
            created_by: clinic.admin.id,
        })
        .unwrap();

    let availability = clinic.workflow().availability(clinic.doctor.id, None, monday()).unwrap();

    assert_eq!(availability, DayAvailability::Slots(Vec::new()));
    assert_eq!(availability.message(), Some("No available slots."));
}

#[test]
fn stale_slot_is_rejected_and_recompute_offers_fresh_choices() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let stale = workflow.availability(clinic.doctor.id, None, monday()).unwrap();
    let chosen = stale.slots()[2].clone();

    // Someone else takes the slot first.
    workflow
        .book(
            &clinic.admin,
            BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &chosen),
        )
        .unwrap();

    let err = workflow
        .book(
            &clinic.receptionist,
            BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &chosen),
        )
        .unwrap_err();
    assert!(err.is_conflict());

    let fresh = workflow.availability(clinic.doctor.id, None, monday()).unwrap();
    assert!(!fresh.slots().contains(&chosen));
    assert!(fresh.slots().len() < stale.slots().len());
}

#[test]
fn booking_outside_home_branch_is_forbidden() {
    let clinic = Clinic::new();
    let other = BranchId::new();

    let err = clinic
        .workflow()
        .book(
            &clinic.receptionist,
            BookingRequest {
                branch_id: other,
                doctor_id: clinic.doctor.id,
                patient_id: PatientId::new(),
                start: Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 3, 16, 9, 30, 0).unwrap(),
                notes: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, ClinicError::Forbidden(_)));
    assert!(clinic.appointments.all().unwrap().is_empty());
}

#[test]
fn blank_notes_are_stored_as_none() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let slot = workflow.availability(clinic.doctor.id, None, monday()).unwrap().slots()[0].clone();
    let mut request =
        BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &slot);
    request.notes = Some("   ".to_string());

    let booked = workflow.book(&clinic.receptionist, request).unwrap();

    assert_eq!(booked.notes, None);
}

#[test]
fn receptionist_cannot_record_clinical_notes_but_doctor_can() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let slot = workflow.availability(clinic.doctor.id, None, monday()).unwrap().slots()[0].clone();
    let booked = workflow
        .book(
            &clinic.receptionist,
            BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &slot),
        )
        .unwrap();

    let err = workflow
        .record_clinical_notes(&clinic.receptionist, booked.id, Some("Flu"), None)
        .unwrap_err();
    assert!(matches!(err, ClinicError::Forbidden(_)));

    let updated = workflow
        .record_clinical_notes(&clinic.doctor, booked.id, Some(" Flu "), Some(""))
        .unwrap();
    assert_eq!(updated.diagnosis.as_deref(), Some("Flu"));
    assert_eq!(updated.progress, None);
}

#[test]
fn cancelling_reopens_the_slot() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let slot = workflow.availability(clinic.doctor.id, None, monday()).unwrap().slots()[0].clone();
    let booked = workflow
        .book(
            &clinic.receptionist,
            BookingRequest::for_slot(clinic.branch, clinic.doctor.id, PatientId::new(), &slot),
        )
        .unwrap();

    workflow
        .update_status(&clinic.receptionist, booked.id, AppointmentStatus::Cancelled)
        .unwrap();

    let after = workflow.availability(clinic.doctor.id, None, monday()).unwrap();
    assert!(after.slots().contains(&slot));
}

#[test]
fn doctor_replaces_own_schedule() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let rows = vec![
        DoctorSchedule {
            doctor_id: clinic.doctor.id,
            branch_id: clinic.branch,
            rule: WeeklyScheduleRule::parse(2, "08:00", "10:00", Some(60)).unwrap(),
        },
        DoctorSchedule {
            doctor_id: clinic.doctor.id,
            branch_id: clinic.branch,
            rule: WeeklyScheduleRule::parse(2, "14:00", "16:00", Some(60)).unwrap(),
        },
    ];

    workflow
        .replace_schedule(&clinic.doctor, clinic.doctor.id, rows)
        .unwrap();

    assert_eq!(
        workflow.availability(clinic.doctor.id, None, monday()).unwrap(),
        DayAvailability::NoSchedule
    );
    let tuesday = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
    assert_eq!(
        workflow
            .availability(clinic.doctor.id, None, tuesday)
            .unwrap()
            .slots()
            .len(),
        4
    );
}

#[test]
fn invalid_rule_aborts_the_whole_replace() {
    let clinic = Clinic::new();
    let workflow = clinic.workflow();
    let rows = vec![
        DoctorSchedule {
            doctor_id: clinic.doctor.id,
            branch_id: clinic.branch,
            rule: WeeklyScheduleRule::parse(2, "08:00", "10:00", Some(30)).unwrap(),
        },
        DoctorSchedule {
            doctor_id: clinic.doctor.id,
            branch_id: clinic.branch,
            rule: WeeklyScheduleRule::parse(3, "12:00", "10:00", Some(30)).unwrap(),
        },
    ];

    let err = workflow
        .replace_schedule(&clinic.admin, clinic.doctor.id, rows)
        .unwrap_err();

    assert!(matches!(err, ClinicError::InvalidRule(_)));
    let kept = clinic.schedules.rules_for(clinic.doctor.id, None).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].rule.day_of_week, 1);
}

#[test]
fn staff_of_another_branch_cannot_replace_schedule() {
    let clinic = Clinic::new();
    let outsider = Principal {
        id: ProfileId::new(),
        role: Role::Receptionist,
        branch_id: Some(BranchId::new()),
    };

    let err = clinic
        .workflow()
        .replace_schedule(&outsider, clinic.doctor.id, Vec::new())
        .unwrap_err();

    assert!(matches!(err, ClinicError::Forbidden(_)));
    assert_eq!(clinic.schedules.rules_for(clinic.doctor.id, None).unwrap().len(), 1);
}

#[test]
fn listing_is_scoped_to_home_branch_unless_admin() {
    let clinic = Clinic::new();
    let other_branch = BranchId::new();
    let other_doctor = ProfileId::new();
    for (branch, doctor) in [(clinic.branch, clinic.doctor.id), (other_branch, other_doctor)] {
        clinic
            .appointments
            .insert(NewAppointment {
                branch_id: branch,
                doctor_id: doctor,
                patient_id: PatientId::new(),
                start: Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2026, 3, 16, 9, 30, 0).unwrap(),
                notes: None,
                created_by: clinic.admin.id,
            })
            .unwrap();
    }
    let workflow = clinic.workflow();

    let mine = workflow
        .appointments(&clinic.receptionist, AppointmentFilter::default())
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].branch_id, clinic.branch);

    let all = workflow
        .appointments(&clinic.admin, AppointmentFilter::default())
        .unwrap();
    assert_eq!(all.len(), 2);

    let err = workflow
        .appointments(
            &clinic.receptionist,
            AppointmentFilter {
                branch_id: Some(other_branch),
                ..AppointmentFilter::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ClinicError::Forbidden(_)));
}
