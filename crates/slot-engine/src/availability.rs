//! Bookable-slot computation for one date.
//!
//! Runs the full pipeline: window selection, per-window candidate generation,
//! conflict filtering, then aggregation in window-then-time order. Every call is
//! a pure function of its inputs, so callers simply recompute whenever the date,
//! windows, appointments, or service duration change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::filter_conflicts;
use crate::error::Result;
use crate::generator::generate_candidates;
use crate::model::{validate_appointments, Appointment, AvailabilityWindow, ServiceDuration, TimeOfDay};
use crate::window::select_windows;

/// The four inputs of a slot computation, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub availability_windows: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
    pub service_duration_minutes: i64,
}

impl AvailabilityRequest {
    /// Parse a request from its JSON form.
    ///
    /// # Errors
    /// Returns `SlotError::Json` for malformed JSON, unparseable dates or times,
    /// and appointments missing `durationMinutes`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run [`compute_available_slots`] over this request.
    pub fn compute(&self) -> Result<Vec<TimeOfDay>> {
        compute_available_slots(
            self.date,
            &self.availability_windows,
            &self.existing_appointments,
            self.service_duration_minutes,
        )
    }
}

/// Concatenate per-window results in window order.
///
/// Identical start times produced by overlapping windows are kept, once per window.
pub fn aggregate<I>(per_window: I) -> Vec<TimeOfDay>
where
    I: IntoIterator<Item = Vec<TimeOfDay>>,
{
    per_window.into_iter().flatten().collect()
}

/// Every candidate start time on `date` before any appointment is considered.
pub fn candidate_slots(
    date: NaiveDate,
    windows: &[AvailabilityWindow],
    duration: ServiceDuration,
) -> Vec<TimeOfDay> {
    aggregate(
        select_windows(windows, date)
            .into_iter()
            .map(|w| generate_candidates(w, duration)),
    )
}

/// Compute the ordered start times on `date` that fit a service of
/// `service_duration_minutes` without overlapping any non-cancelled appointment.
///
/// `windows` and `appointments` must be scoped to a single business. The result
/// is an optimistic hint: a booking made from it must still pass the
/// authoritative check in [`crate::booking::verify_booking`].
///
/// # Errors
/// Returns `SlotError::InvalidDuration` if `service_duration_minutes <= 0`, and
/// `SlotError::InvalidAppointmentDuration` if any appointment has a zero duration,
/// and `SlotError::OutOfRange` if an appointment or slot would end past the last
/// representable timestamp.
/// An empty window list, a date outside every window, and an empty appointment
/// list are all normal and produce `Ok`.
pub fn compute_available_slots(
    date: NaiveDate,
    windows: &[AvailabilityWindow],
    appointments: &[Appointment],
    service_duration_minutes: i64,
) -> Result<Vec<TimeOfDay>> {
    let duration = ServiceDuration::new(service_duration_minutes)?;
    validate_appointments(appointments)?;

    let selected = select_windows(windows, date);
    debug!(
        %date,
        windows = windows.len(),
        selected = selected.len(),
        duration_minutes = duration.minutes(),
        "selected availability windows"
    );

    let per_window = selected
        .into_iter()
        .map(|window| {
            let candidates = generate_candidates(window, duration);
            let free = filter_conflicts(&candidates, appointments, date, duration)?;
            debug!(
                window_start = %window.daily_start_time,
                window_end = %window.daily_end_time,
                candidates = candidates.len(),
                free = free.len(),
                "filtered window candidates"
            );
            Ok(free)
        })
        .collect::<Result<Vec<_>>>()?;
    let slots = aggregate(per_window);

    debug!(%date, slots = slots.len(), "computed available slots");
    Ok(slots)
}
