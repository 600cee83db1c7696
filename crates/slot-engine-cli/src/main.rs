//! `slots` CLI: compute bookable slots and check bookings from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Compute slots for a JSON request (stdin → stdout)
//! cat request.json | slots compute
//!
//! # From file to file, one slot per line
//! slots compute -i request.json -o slots.txt --format lines
//!
//! # Check whether 10:30 can still be booked on the request's date
//! slots check -i request.json --time 10:30 --service-id 3 --now 2026-03-01T08:00:00
//!
//! # Trace the pipeline stages on stderr
//! slots -v compute -i request.json
//! ```
//!
//! The request has the shape:
//!
//! ```json
//! {
//!   "date": "2026-03-16",
//!   "availabilityWindows": [{"businessId": 1, "startDate": "2026-03-01",
//!     "endDate": "2026-03-31", "startTime": "09:00", "endTime": "17:00"}],
//!   "existingAppointments": [{"businessId": 1, "serviceId": 3,
//!     "dateTime": "2026-03-16T10:00:00", "durationMinutes": 30, "status": "CONFIRMED"}],
//!   "serviceDurationMinutes": 30
//! }
//! ```

use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use slot_engine::{verify_booking, AvailabilityRequest, BookingRequest, TimeOfDay};
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "slots", version, about = "Bookable appointment slot calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline details to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the bookable start times for a request
    Compute {
        /// Input JSON request (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Check whether a start time on the request's date can be booked right now
    Check {
        /// Input JSON request (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Requested start time (HH:MM)
        #[arg(long)]
        time: TimeOfDay,
        /// Business to book with (defaults to the first window's business)
        #[arg(long)]
        business_id: Option<u64>,
        /// Service being booked
        #[arg(long)]
        service_id: u64,
        /// Reference time for the past-booking check (defaults to the local clock)
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON array of "HH:MM" strings
    Json,
    /// One "HH:MM" per line
    Lines,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compute {
            input,
            output,
            format,
        } => {
            let request = read_request(input.as_deref())?;
            let slots = request.compute().context("Failed to compute available slots")?;

            if slots.is_empty() {
                if request.availability_windows.is_empty() {
                    warn!("business has not configured availability");
                } else {
                    debug!(date = %request.date, "no slots on this date");
                }
            }

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string(&slots)?,
                OutputFormat::Lines => slots
                    .iter()
                    .map(|s| format!("{}\n", s))
                    .collect::<String>(),
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Check {
            input,
            time,
            business_id,
            service_id,
            now,
        } => {
            let request = read_request(input.as_deref())?;
            let business_id = match business_id {
                Some(id) => id,
                None => request
                    .availability_windows
                    .first()
                    .map(|w| w.business_id)
                    .context("No --business-id given and the request has no windows")?,
            };
            let booking = BookingRequest {
                business_id,
                service_id,
                date_time: time.on(request.date),
                duration_minutes: request.service_duration_minutes,
            };
            let now = now.unwrap_or_else(|| Local::now().naive_local());

            match verify_booking(
                &booking,
                &request.availability_windows,
                &request.existing_appointments,
                now,
            ) {
                Ok(()) => println!("available"),
                Err(e) => {
                    eprintln!("rejected: {}", e);
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Install a stderr subscriber so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_request(path: Option<&str>) -> Result<AvailabilityRequest> {
    let json = read_input(path)?;
    AvailabilityRequest::from_json(&json).context("Failed to parse availability request")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
