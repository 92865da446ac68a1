//! # slot-engine
//!
//! Deterministic appointment slot computation for multi-branch clinics.
//!
//! Given a doctor's recurring weekly schedule and the appointments already on
//! their calendar, the engine computes the ordered list of bookable slots for
//! one calendar date. The computation is a pure function; everything around it
//! (stores, capabilities, the booking workflow) is passed in explicitly.
//!
//! ## Modules
//!
//! - [`slots`]: weekly rules + bookings → ordered bookable slots
//! - [`schedule`]: weekly schedule rules and their validation
//! - [`appointment`]: appointments, statuses and booked intervals
//! - [`conflict`]: read-time and write-time overlap tests
//! - [`clock`]: clinic timezone and wall-clock conversion
//! - [`dst`]: DST gap policies
//! - [`access`]: staff roles and capabilities
//! - [`store`]: schedule and appointment store traits, in-memory stores
//! - [`snapshot`]: JSON snapshot of store contents
//! - [`workflow`]: availability lookup and booking over the stores
//! - [`config`]: engine configuration from the environment
//! - [`error`]: Error types

pub mod access;
pub mod appointment;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod ids;
pub mod schedule;
pub mod slots;
pub mod snapshot;
pub mod store;
pub mod workflow;

pub use access::{Capabilities, Capability, Principal, Role};
pub use appointment::{Appointment, AppointmentStatus, BookedInterval, NewAppointment};
pub use clock::ClinicClock;
pub use config::EngineConfig;
pub use conflict::{blocks_slot, find_conflicts, overlaps, BookingBoundary, Conflict};
pub use dst::DstPolicy;
pub use error::ClinicError;
pub use ids::{AppointmentId, BranchId, PatientId, ProfileId};
pub use schedule::{DoctorSchedule, WeeklyScheduleRule};
pub use slots::{compute_available_slots, Slot, SlotEngine};
pub use snapshot::ClinicSnapshot;
pub use store::{AppointmentStore, InMemoryAppointmentStore, InMemoryScheduleStore, ScheduleStore};
pub use workflow::{BookingRequest, BookingWorkflow, DayAvailability};
