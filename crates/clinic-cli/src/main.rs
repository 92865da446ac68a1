//! `clinic-slots` CLI: compute and book appointment slots from a clinic snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # List bookable slots for a doctor on a date
//! clinic-slots slots --data clinic.json --doctor <id> --date 2026-03-16
//!
//! # Same, limited to one branch, as JSON, in the clinic's timezone
//! clinic-slots --tz Europe/Berlin slots --data clinic.json --doctor <id> \
//!     --branch <id> --date 2026-03-16 --json
//!
//! # Book the slot starting at 09:30 and write the snapshot back
//! clinic-slots book --data clinic.json --doctor <id> --branch <id> \
//!     --patient <id> --start 2026-03-16T09:30:00Z --as <staff-id> --role receptionist \
//!     --staff-branch <id>
//!
//! # Check every stored schedule rule
//! clinic-slots validate --data clinic.json
//! ```
//!
//! Defaults come from `CLINIC_*` environment variables (a `.env` file is
//! honoured); command-line flags override them. Logs go to stderr and are
//! controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use slot_engine::config::parse_slot_minutes;
use slot_engine::schedule::day_name;
use slot_engine::{
    BookingBoundary, BookingRequest, BookingWorkflow, BranchId, ClinicError, ClinicSnapshot,
    DayAvailability, DstPolicy, EngineConfig, PatientId, Principal, ProfileId, Role,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "clinic-slots",
    version,
    about = "Compute and book clinic appointment slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Clinic timezone (IANA name); overrides CLINIC_TIMEZONE
    #[arg(long, global = true)]
    tz: Option<String>,

    /// Slot length for rules without one; overrides CLINIC_DEFAULT_SLOT_MINUTES
    #[arg(long, global = true)]
    fallback_minutes: Option<String>,

    /// skip, shift_forward or wall_clock; overrides CLINIC_DST_POLICY
    #[arg(long, global = true)]
    dst_policy: Option<DstPolicy>,

    /// inclusive or half_open; overrides CLINIC_BOOKING_BOUNDARY
    #[arg(long, global = true)]
    boundary: Option<BookingBoundary>,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable slots for a doctor on a date
    Slots {
        /// Clinic snapshot (JSON)
        #[arg(short, long)]
        data: String,
        #[arg(long)]
        doctor: ProfileId,
        /// Only use schedule rules at this branch
        #[arg(long)]
        branch: Option<BranchId>,
        /// Civil date in the clinic's timezone (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Print slots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Book an appointment and write the snapshot back
    Book {
        /// Clinic snapshot (JSON)
        #[arg(short, long)]
        data: String,
        #[arg(long)]
        doctor: ProfileId,
        #[arg(long)]
        branch: BranchId,
        #[arg(long)]
        patient: PatientId,
        /// Start instant (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End instant (RFC 3339); defaults to the end of the slot starting at --start
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        notes: Option<String>,
        /// Profile id of the staff member booking
        #[arg(long = "as")]
        acting_as: ProfileId,
        /// Role of the staff member booking
        #[arg(long)]
        role: Role,
        /// Home branch of the staff member booking
        #[arg(long)]
        staff_branch: Option<BranchId>,
    },
    /// Validate every schedule rule in a snapshot
    Validate {
        /// Clinic snapshot (JSON)
        #[arg(short, long)]
        data: String,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Slots {
            data,
            doctor,
            branch,
            date,
            json,
        } => {
            let (schedules, appointments) = load_snapshot(&data)?.into_stores();
            let workflow = BookingWorkflow::new(&schedules, &appointments, config);
            let availability = workflow
                .availability(doctor, branch, date)
                .context("Failed to compute availability")?;

            if json {
                println!("{}", serde_json::to_string_pretty(availability.slots())?);
            } else {
                print_availability(&availability);
            }
        }
        Commands::Book {
            data,
            doctor,
            branch,
            patient,
            start,
            end,
            notes,
            acting_as,
            role,
            staff_branch,
        } => {
            let (schedules, appointments) = load_snapshot(&data)?.into_stores();
            let workflow = BookingWorkflow::new(&schedules, &appointments, config);
            let date = config.clock().local_date(start);

            let end = match end {
                Some(end) => end,
                None => workflow
                    .availability(doctor, Some(branch), date)?
                    .slots()
                    .iter()
                    .find(|slot| slot.start == start)
                    .map(|slot| slot.end)
                    .with_context(|| format!("No available slot starts at {}", start))?,
            };

            let principal = Principal {
                id: acting_as,
                role,
                branch_id: staff_branch,
            };
            let request = BookingRequest {
                branch_id: branch,
                doctor_id: doctor,
                patient_id: patient,
                start,
                end,
                notes,
            };

            match workflow.book(&principal, request) {
                Ok(appointment) => {
                    let snapshot = ClinicSnapshot::from_stores(&schedules, &appointments)?;
                    std::fs::write(&data, snapshot.to_json_pretty()?)
                        .with_context(|| format!("Failed to write file: {}", data))?;
                    println!(
                        "Booked {} {}",
                        appointment.id,
                        config.clock().wall_label(appointment.start)
                    );
                }
                Err(ClinicError::Conflict { conflicts }) => {
                    eprintln!(
                        "That time was just taken ({} overlapping appointment(s)). Please pick another slot.",
                        conflicts.len()
                    );
                    let fresh = workflow.availability(doctor, Some(branch), date)?;
                    for slot in fresh.slots() {
                        eprintln!("  {}", slot.label);
                    }
                    anyhow::bail!("Booking conflict");
                }
                Err(e) => return Err(e).context("Failed to book appointment"),
            }
        }
        Commands::Validate { data } => {
            let snapshot = load_snapshot(&data)?;
            for row in &snapshot.schedules {
                row.rule.validate().with_context(|| {
                    format!(
                        "Invalid rule for doctor {} on {}",
                        row.doctor_id,
                        day_name(row.rule.day_of_week).unwrap_or("an unknown day")
                    )
                })?;
            }
            println!("{} schedule rule(s) OK", snapshot.schedules.len());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Environment first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env().context("Invalid CLINIC_* environment")?;

    if let Some(tz) = &cli.tz {
        config.timezone = tz
            .parse()
            .map_err(|_| ClinicError::InvalidTimezone(tz.clone()))?;
    }
    if let Some(minutes) = &cli.fallback_minutes {
        config.fallback_slot_minutes = parse_slot_minutes(minutes)?;
    }
    if let Some(policy) = cli.dst_policy {
        config.dst_policy = policy;
    }
    if let Some(boundary) = cli.boundary {
        config.boundary = boundary;
    }

    tracing::debug!(?config, "engine configuration");
    Ok(config)
}

fn load_snapshot(path: &str) -> Result<ClinicSnapshot> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    ClinicSnapshot::from_json(&json).with_context(|| format!("Failed to load snapshot: {}", path))
}

fn print_availability(availability: &DayAvailability) {
    if let Some(message) = availability.message() {
        println!("{}", message);
        return;
    }
    for slot in availability.slots() {
        println!("{}", slot.label);
    }
}
