//! Authoritative booking check at write time.
//!
//! Slot lists from [`crate::availability`] are computed from a snapshot and can go
//! stale between the moment a customer sees them and the moment they book. Two
//! customers can both see the same free slot. The booking-creation side must
//! therefore re-verify against the current appointment set, atomically with the
//! insert. [`verify_booking`] is that re-verification. [`BookingLedger`] shows the
//! required atomicity for a single business by holding one lock across the
//! check and the insert.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::availability::compute_available_slots;
use crate::conflict::{appointments_for_business, find_conflicts};
use crate::error::{Result, SlotError};
use crate::model::{
    validate_appointments, Appointment, AppointmentStatus, AvailabilityWindow, OccupiedInterval,
    ServiceDuration, TimeOfDay,
};
use crate::window::select_windows;

/// A customer's request to occupy `[date_time, date_time + duration_minutes)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub business_id: u64,
    pub service_id: u64,
    pub date_time: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Verify that `request` can be committed against the current state.
///
/// Checks, in order:
/// 1. the request and every appointment have positive durations whose end
///    can be represented;
/// 2. the start is not before `now`;
/// 3. no non-cancelled appointment of the same business overlaps the interval
///    (touching is fine);
/// 4. some window of the same business covering the date contains the whole
///    interval within its daily hours.
///
/// Grid alignment is not required, so a start time entered by hand may pass as
/// long as it fits.
///
/// # Errors
/// `InvalidDuration`, `InvalidAppointmentDuration`, `OutOfRange`, `InPast`,
/// `SlotTaken`, or `OutsideAvailability`, matching the first failed check.
pub fn verify_booking(
    request: &BookingRequest,
    windows: &[AvailabilityWindow],
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<()> {
    let duration = ServiceDuration::new(request.duration_minutes)?;
    validate_appointments(appointments)?;

    if request.date_time < now {
        debug!(requested = %request.date_time, %now, "rejecting booking in the past");
        return Err(SlotError::InPast(request.date_time));
    }

    let interval = OccupiedInterval::new(request.date_time, duration)?;

    let scoped = appointments_for_business(appointments, request.business_id);
    if let Some(conflict) = find_conflicts(&interval, &scoped)?.into_iter().next() {
        debug!(
            requested = %request.date_time,
            conflicting = %conflict.appointment.date_time,
            overlap_minutes = conflict.overlap_minutes,
            "rejecting booking that overlaps an appointment"
        );
        return Err(SlotError::SlotTaken {
            requested: request.date_time,
            conflicting: conflict.appointment.date_time,
        });
    }

    let date = request.date_time.date();
    let fits = select_windows(windows, date)
        .into_iter()
        .filter(|w| w.business_id == request.business_id)
        .any(|w| w.hours_on(date).contains(&interval));
    if !fits {
        debug!(requested = %request.date_time, "rejecting booking outside availability");
        return Err(SlotError::OutsideAvailability(request.date_time));
    }

    Ok(())
}

/// In-memory appointment store for one business that commits bookings atomically.
///
/// The check in [`verify_booking`] and the insert happen under the same lock,
/// so concurrent requests for one slot yield exactly one success.
#[derive(Debug)]
pub struct BookingLedger {
    business_id: u64,
    windows: Vec<AvailabilityWindow>,
    appointments: Mutex<Vec<Appointment>>,
}

impl BookingLedger {
    pub fn new(business_id: u64, windows: Vec<AvailabilityWindow>) -> Self {
        Self::with_appointments(business_id, windows, Vec::new())
    }

    /// Start from an existing appointment set. Records for other businesses are dropped.
    pub fn with_appointments(
        business_id: u64,
        windows: Vec<AvailabilityWindow>,
        appointments: Vec<Appointment>,
    ) -> Self {
        let windows = windows
            .into_iter()
            .filter(|w| w.business_id == business_id)
            .collect();
        let appointments = appointments
            .into_iter()
            .filter(|a| a.business_id == business_id)
            .collect();
        Self {
            business_id,
            windows,
            appointments: Mutex::new(appointments),
        }
    }

    pub fn business_id(&self) -> u64 {
        self.business_id
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Appointment>> {
        // Holders only push whole records or set one field, so a poisoned
        // vector is still consistent.
        self.appointments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Verify and record a booking as `PENDING`.
    ///
    /// # Errors
    /// `BusinessMismatch` for another business's request, otherwise any error
    /// from [`verify_booking`].
    pub fn book(&self, request: &BookingRequest, now: NaiveDateTime) -> Result<Appointment> {
        if request.business_id != self.business_id {
            return Err(SlotError::BusinessMismatch {
                ledger: self.business_id,
                requested: request.business_id,
            });
        }

        let mut appointments = self.lock();
        verify_booking(request, &self.windows, &appointments, now)?;

        let duration = ServiceDuration::new(request.duration_minutes)?;
        let appointment = Appointment {
            business_id: request.business_id,
            service_id: request.service_id,
            date_time: request.date_time,
            duration_minutes: duration.minutes(),
            status: AppointmentStatus::Pending,
        };
        appointments.push(appointment.clone());
        info!(
            business_id = self.business_id,
            service_id = request.service_id,
            start = %request.date_time,
            "booked appointment"
        );
        Ok(appointment)
    }

    /// Move the active appointment starting at `date_time` to `status`.
    ///
    /// # Errors
    /// `AppointmentNotFound` when no non-cancelled appointment starts there, or
    /// `InvalidTransition` when the lifecycle forbids the change.
    pub fn update_status(
        &self,
        date_time: NaiveDateTime,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let mut appointments = self.lock();
        let appointment = appointments
            .iter_mut()
            .find(|a| a.date_time == date_time && a.is_blocking())
            .ok_or(SlotError::AppointmentNotFound(date_time))?;

        if !appointment.status.can_transition_to(status) {
            return Err(SlotError::InvalidTransition {
                from: appointment.status,
                to: status,
            });
        }
        appointment.status = status;
        info!(start = %date_time, %status, "updated appointment status");
        Ok(appointment.clone())
    }

    /// A point-in-time copy of every recorded appointment, including cancelled ones.
    pub fn snapshot(&self) -> Vec<Appointment> {
        self.lock().clone()
    }

    /// Slots on `date` against the current appointment set.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        service_duration_minutes: i64,
    ) -> Result<Vec<TimeOfDay>> {
        let appointments = self.snapshot();
        compute_available_slots(date, &self.windows, &appointments, service_duration_minutes)
    }
}
