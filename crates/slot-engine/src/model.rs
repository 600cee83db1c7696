//! Value types shared by every stage of the slot pipeline.
//!
//! Dates and timestamps are timezone-free (`NaiveDate` / `NaiveDateTime`), and
//! time-of-day is carried as whole minutes since midnight so slot arithmetic
//! never goes through string formatting.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Upper bound on the step between candidate start times.
pub const MAX_GRANULARITY_MINUTES: u32 = 30;

/// Number of minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

/// A wall-clock time on an unspecified date, with minute precision.
///
/// Parses `"HH:MM"` and `"HH:MM:SS"` (seconds must be zero) and always
/// serializes as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Midnight, the first minute of the day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from minutes since midnight. Returns `None` past `23:59`.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Build from an hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Convert a `NaiveTime`, rejecting any sub-minute component.
    pub fn from_naive_time(time: NaiveTime) -> Result<Self> {
        if time.second() != 0 || time.nanosecond() != 0 {
            return Err(SlotError::InvalidTime(format!(
                "{} has a non-zero seconds component",
                time
            )));
        }
        Ok(Self(time.hour() * 60 + time.minute()))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::MIN + Duration::minutes(i64::from(self.0))
    }

    /// Anchor this time on a calendar date.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let time = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|e| SlotError::InvalidTime(format!("'{}': {}", s, e)))?;
        Self::from_naive_time(time)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// ServiceDuration
// ---------------------------------------------------------------------------

/// A validated, strictly positive length in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceDuration(NonZeroU32);

impl ServiceDuration {
    /// Validate a raw minute count.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDuration` for zero, negative, or oversized values.
    pub fn new(minutes: i64) -> Result<Self> {
        u32::try_from(minutes)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(SlotError::InvalidDuration(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0.get()
    }

    /// Step between candidate start times: `min(30, duration)`.
    pub fn granularity(self) -> u32 {
        self.minutes().min(MAX_GRANULARITY_MINUTES)
    }

    pub fn as_chrono(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }
}

// ---------------------------------------------------------------------------
// Intervals
// ---------------------------------------------------------------------------

/// Half-open range `[start, end)` occupied by a slot or an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl OccupiedInterval {
    /// # Errors
    /// Returns `SlotError::OutOfRange` when `start + duration` is past the last
    /// representable timestamp.
    pub fn new(start: NaiveDateTime, duration: ServiceDuration) -> Result<Self> {
        let end = start
            .checked_add_signed(duration.as_chrono())
            .ok_or(SlotError::OutOfRange(start))?;
        Ok(Self { start, end })
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Two intervals overlap iff `a.start < b.end && a.end > b.start`.
    /// Touching intervals (`a.end == b.start`) do not overlap, and an empty
    /// interval overlaps nothing.
    pub fn overlaps(&self, other: &OccupiedInterval) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && self.end > other.start
    }

    /// Minutes shared with `other`, zero when they do not overlap.
    pub fn overlap_minutes(&self, other: &OccupiedInterval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_minutes()
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &OccupiedInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    #[serde(alias = "DONE")]
    Completed,
}

impl AppointmentStatus {
    /// Everything except a cancellation still occupies its interval.
    pub fn is_blocking(self) -> bool {
        self != AppointmentStatus::Cancelled
    }

    /// Cancelled and completed appointments are final; nothing returns to pending.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        match self {
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => false,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed => {
                next != AppointmentStatus::Pending
            }
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        };
        f.write_str(name)
    }
}

/// A recurring daily working window, applicable on every date in
/// `[start_date, end_date]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub business_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(alias = "startTime")]
    pub daily_start_time: TimeOfDay,
    #[serde(alias = "endTime")]
    pub daily_end_time: TimeOfDay,
}

impl AvailabilityWindow {
    /// Inclusive date-range check; time of day plays no part.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// The working hours of this window on `date`.
    pub fn hours_on(&self, date: NaiveDate) -> OccupiedInterval {
        OccupiedInterval {
            start: self.daily_start_time.on(date),
            end: self.daily_end_time.on(date),
        }
    }

    /// Creation-time rules for a window: the date range may be a single day,
    /// but the daily hours must be non-empty.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidWindow` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(SlotError::InvalidWindow(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        if self.daily_end_time <= self.daily_start_time {
            return Err(SlotError::InvalidWindow(format!(
                "end time {} must be after start time {}",
                self.daily_end_time, self.daily_start_time
            )));
        }
        Ok(())
    }
}

/// An existing booking. Its duration is copied from the service at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub business_id: u64,
    pub service_id: u64,
    pub date_time: NaiveDateTime,
    #[serde(alias = "serviceDuration")]
    pub duration_minutes: u32,
    /// Missing on the wire means `PENDING`, which blocks.
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }

    /// # Errors
    /// Returns `SlotError::InvalidAppointmentDuration` when the stored duration is zero.
    pub fn duration(&self) -> Result<ServiceDuration> {
        ServiceDuration::new(i64::from(self.duration_minutes))
            .map_err(|_| SlotError::InvalidAppointmentDuration(self.date_time))
    }

    /// The half-open interval this appointment occupies. A zero duration gives
    /// an empty interval.
    ///
    /// # Errors
    /// Returns `SlotError::OutOfRange` when the end is past the last
    /// representable timestamp.
    pub fn occupied(&self) -> Result<OccupiedInterval> {
        let end = self
            .date_time
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .ok_or(SlotError::OutOfRange(self.date_time))?;
        Ok(OccupiedInterval {
            start: self.date_time,
            end,
        })
    }
}

/// A bookable service from the business's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u64,
    pub business_id: u64,
    #[serde(default)]
    pub name: String,
    pub duration_minutes: i64,
}

impl Service {
    /// # Errors
    /// Returns `SlotError::InvalidDuration` when the catalog duration is not positive.
    pub fn duration(&self) -> Result<ServiceDuration> {
        ServiceDuration::new(self.duration_minutes)
    }
}

/// Reject any appointment whose duration is zero or whose end cannot be represented.
pub(crate) fn validate_appointments(appointments: &[Appointment]) -> Result<()> {
    appointments.iter().try_for_each(|a| {
        a.duration()?;
        a.occupied().map(|_| ())
    })
}
