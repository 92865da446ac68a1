//! Tests for read-time slot blocking and write-time conflict detection.

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::{
    blocks_slot, find_conflicts, overlaps, Appointment, AppointmentId, AppointmentStatus,
    BookedInterval, BookingBoundary, BranchId, PatientId, ProfileId,
};

/// Helper: an instant on 2026-03-01.
fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, min, 0).unwrap()
}

fn interval(sh: u32, sm: u32, eh: u32, em: u32) -> BookedInterval {
    BookedInterval {
        start: at(sh, sm),
        end: at(eh, em),
    }
}

fn appointment(sh: u32, sm: u32, eh: u32, em: u32, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: AppointmentId::new(),
        branch_id: BranchId::new(),
        doctor_id: ProfileId::new(),
        patient_id: PatientId::new(),
        start: at(sh, sm),
        end: at(eh, em),
        status,
        notes: None,
        diagnosis: None,
        progress: None,
        created_by: ProfileId::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// blocks_slot (inclusive)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slot_ending_at_booking_start_is_blocked() {
    assert!(blocks_slot(at(9, 30), at(10, 0), &interval(10, 0, 10, 30)));
}

#[test]
fn slot_starting_at_booking_end_is_blocked() {
    assert!(blocks_slot(at(10, 30), at(11, 0), &interval(10, 0, 10, 30)));
}

#[test]
fn identical_interval_is_blocked() {
    assert!(blocks_slot(at(10, 0), at(10, 30), &interval(10, 0, 10, 30)));
}

#[test]
fn booking_covering_slot_is_blocked() {
    assert!(blocks_slot(at(10, 0), at(10, 30), &interval(9, 0, 12, 0)));
}

#[test]
fn booking_inside_slot_is_blocked() {
    assert!(blocks_slot(at(9, 0), at(10, 0), &interval(9, 15, 9, 45)));
}

#[test]
fn separate_slot_is_not_blocked() {
    assert!(!blocks_slot(at(8, 0), at(8, 30), &interval(10, 0, 10, 30)));
    assert!(!blocks_slot(at(11, 0), at(11, 30), &interval(10, 0, 10, 30)));
}

// ─────────────────────────────────────────────────────────────────────────────
// overlaps (half-open)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn adjacent_intervals_do_not_overlap() {
    assert!(!overlaps(at(9, 0), at(10, 0), at(10, 0), at(11, 0)));
    assert!(!overlaps(at(10, 0), at(11, 0), at(9, 0), at(10, 0)));
}

#[test]
fn partial_overlap_is_detected_both_ways() {
    assert!(overlaps(at(9, 0), at(10, 0), at(9, 30), at(10, 30)));
    assert!(overlaps(at(9, 30), at(10, 30), at(9, 0), at(10, 0)));
}

#[test]
fn boundary_modes_differ_only_on_touching() {
    let booked = interval(10, 0, 10, 30);

    assert!(BookingBoundary::Inclusive.blocks(at(9, 30), at(10, 0), &booked));
    assert!(!BookingBoundary::HalfOpen.blocks(at(9, 30), at(10, 0), &booked));

    assert!(BookingBoundary::Inclusive.blocks(at(10, 15), at(10, 45), &booked));
    assert!(BookingBoundary::HalfOpen.blocks(at(10, 15), at(10, 45), &booked));
}

#[test]
fn boundary_parses_from_config_names() {
    assert_eq!("inclusive".parse::<BookingBoundary>().unwrap(), BookingBoundary::Inclusive);
    assert_eq!("half_open".parse::<BookingBoundary>().unwrap(), BookingBoundary::HalfOpen);
    assert!("closed".parse::<BookingBoundary>().is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// find_conflicts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflict_reports_overlap_minutes() {
    let existing = vec![appointment(9, 30, 10, 30, AppointmentStatus::Scheduled)];

    let conflicts = find_conflicts(at(9, 0), at(10, 0), &existing);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].appointment_id, existing[0].id);
    assert_eq!(conflicts[0].overlap_minutes, 30);
}

#[test]
fn cancelled_and_completed_appointments_never_conflict() {
    let existing = vec![
        appointment(9, 0, 10, 0, AppointmentStatus::Cancelled),
        appointment(9, 0, 10, 0, AppointmentStatus::Completed),
        appointment(9, 0, 10, 0, AppointmentStatus::NoShow),
        appointment(9, 0, 10, 0, AppointmentStatus::Rescheduled),
    ];

    assert!(find_conflicts(at(9, 0), at(10, 0), &existing).is_empty());
}

#[test]
fn back_to_back_appointment_is_not_a_conflict() {
    let existing = vec![appointment(10, 0, 10, 30, AppointmentStatus::Scheduled)];

    assert!(find_conflicts(at(9, 30), at(10, 0), &existing).is_empty());
    assert!(find_conflicts(at(10, 30), at(11, 0), &existing).is_empty());
}

#[test]
fn multiple_conflicts_are_all_reported() {
    let existing = vec![
        appointment(9, 0, 9, 30, AppointmentStatus::Scheduled),
        appointment(9, 45, 10, 15, AppointmentStatus::Scheduled),
        appointment(11, 0, 11, 30, AppointmentStatus::Scheduled),
    ];

    let conflicts = find_conflicts(at(9, 15), at(10, 0), &existing);

    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].overlap_minutes, 15);
    assert_eq!(conflicts[1].overlap_minutes, 15);
}
