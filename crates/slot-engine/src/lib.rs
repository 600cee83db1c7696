//! # slot-engine
//!
//! Deterministic computation of bookable appointment slots.
//!
//! Given a business's availability windows, a calendar date, a service duration,
//! and the business's existing appointments, the engine returns the ordered
//! start times on that date that do not overlap any active appointment. An
//! error here would either hide valid slots or allow a double booking, so the
//! interval arithmetic is done on typed values and never on strings.
//!
//! ## Modules
//!
//! - [`model`] — `TimeOfDay`, `ServiceDuration`, windows, appointments, intervals
//! - [`window`] — Select the windows covering a date
//! - [`generator`] — Candidate start times within one window
//! - [`conflict`] — Drop candidates that overlap active appointments
//! - [`availability`] — Full pipeline and the JSON request form
//! - [`booking`] — Authoritative write-time check and an atomic in-memory ledger
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod conflict;
pub mod error;
pub mod generator;
pub mod model;
pub mod window;

pub use availability::{aggregate, candidate_slots, compute_available_slots, AvailabilityRequest};
pub use booking::{verify_booking, BookingLedger, BookingRequest};
pub use conflict::{filter_conflicts, find_conflicts, Conflict};
pub use error::SlotError;
pub use generator::generate_candidates;
pub use model::{
    Appointment, AppointmentStatus, AvailabilityWindow, OccupiedInterval, Service,
    ServiceDuration, TimeOfDay,
};
pub use window::select_windows;
