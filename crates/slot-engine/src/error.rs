//! Error types for slot-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::AppointmentStatus;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid service duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("Invalid appointment duration at {0}: duration must be positive")]
    InvalidAppointmentDuration(NaiveDateTime),

    #[error("Interval starting {0} ends past the last representable timestamp")]
    OutOfRange(NaiveDateTime),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid availability window: {0}")]
    InvalidWindow(String),

    /// The request payload was not valid JSON or did not match the expected shape.
    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Requested start {0} is in the past")]
    InPast(NaiveDateTime),

    #[error("Time slot starting {requested} overlaps an existing appointment at {conflicting}")]
    SlotTaken {
        requested: NaiveDateTime,
        conflicting: NaiveDateTime,
    },

    #[error("Requested start {0} is not inside any availability window")]
    OutsideAvailability(NaiveDateTime),

    #[error("Booking for business {requested} sent to ledger of business {ledger}")]
    BusinessMismatch { ledger: u64, requested: u64 },

    #[error("No active appointment starting at {0}")]
    AppointmentNotFound(NaiveDateTime),

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

pub type Result<T> = std::result::Result<T, SlotError>;
