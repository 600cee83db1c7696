//! Remove candidate slots that collide with existing appointments.
//!
//! Every comparison is between half-open intervals. A slot that ends exactly
//! when an appointment starts (or starts exactly when one ends) is NOT a
//! conflict, so back-to-back bookings are allowed. Cancelled appointments are
//! ignored entirely.

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Appointment, OccupiedInterval, ServiceDuration, TimeOfDay};

/// An appointment that blocks a requested interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub appointment: Appointment,
    pub overlap_minutes: i64,
}

/// Find every non-cancelled appointment overlapping `interval`, in input order.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
///
/// # Errors
/// Returns `SlotError::OutOfRange` if an appointment ends past the last
/// representable timestamp.
pub fn find_conflicts(
    interval: &OccupiedInterval,
    appointments: &[Appointment],
) -> Result<Vec<Conflict>> {
    let mut conflicts = Vec::new();
    for appointment in appointments.iter().filter(|a| a.is_blocking()) {
        let occupied = appointment.occupied()?;
        if interval.overlaps(&occupied) {
            conflicts.push(Conflict {
                appointment: appointment.clone(),
                overlap_minutes: interval.overlap_minutes(&occupied),
            });
        }
    }
    Ok(conflicts)
}

/// Keep only the candidates on `date` whose `[start, start + duration)` interval
/// overlaps no non-cancelled appointment. Zero-length appointments block nothing.
///
/// `appointments` must already be scoped to the business being booked; records
/// for other businesses would block slots they have nothing to do with.
///
/// # Errors
/// Returns `SlotError::OutOfRange` if a candidate or appointment interval ends
/// past the last representable timestamp.
pub fn filter_conflicts(
    candidates: &[TimeOfDay],
    appointments: &[Appointment],
    date: NaiveDate,
    duration: ServiceDuration,
) -> Result<Vec<TimeOfDay>> {
    let busy = appointments
        .iter()
        .filter(|a| a.is_blocking())
        .map(Appointment::occupied)
        .collect::<Result<Vec<OccupiedInterval>>>()?;

    let mut free = Vec::with_capacity(candidates.len());
    for &candidate in candidates {
        let slot = OccupiedInterval::new(candidate.on(date), duration)?;
        if !busy.iter().any(|b| slot.overlaps(b)) {
            free.push(candidate);
        }
    }
    Ok(free)
}

/// Narrow a mixed appointment list to the ones belonging to `business_id`.
pub fn appointments_for_business(appointments: &[Appointment], business_id: u64) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.business_id == business_id)
        .cloned()
        .collect()
}
