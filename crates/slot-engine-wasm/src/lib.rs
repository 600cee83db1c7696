//! WASM bindings for slot-engine.
//!
//! Exposes slot computation and the write-time booking check to JavaScript via
//! `wasm-bindgen`. All complex types are passed as JSON strings using the same
//! camelCase field names as the REST payloads the booking UI already fetches.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use slot_engine::{
    compute_available_slots, verify_booking, Appointment, AvailabilityRequest,
    AvailabilityWindow, BookingRequest, SlotError,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct BookingCheckDto {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a reference timestamp.
///
/// Accepts RFC 3339 (the offset is dropped, keeping wall-clock time) and naive
/// local time with or without seconds (e.g., "2026-02-17T14:00:00").
fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn compute_request(request_json: &str) -> Result<String, String> {
    let request = AvailabilityRequest::from_json(request_json).map_err(|e| e.to_string())?;
    let slots = request.compute().map_err(|e| e.to_string())?;
    to_json(&slots)
}

fn compute_parts(
    date: &str,
    windows_json: &str,
    appointments_json: &str,
    service_duration_minutes: i64,
) -> Result<String, String> {
    let date: NaiveDate = date
        .parse()
        .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
    let windows: Vec<AvailabilityWindow> = parse_json(windows_json, "availability windows")?;
    let appointments: Vec<Appointment> = parse_json(appointments_json, "appointments")?;

    let slots = compute_available_slots(date, &windows, &appointments, service_duration_minutes)
        .map_err(|e| e.to_string())?;
    to_json(&slots)
}

fn check_booking(
    booking_json: &str,
    windows_json: &str,
    appointments_json: &str,
    now: &str,
) -> Result<String, String> {
    let booking: BookingRequest = parse_json(booking_json, "booking")?;
    let windows: Vec<AvailabilityWindow> = parse_json(windows_json, "availability windows")?;
    let appointments: Vec<Appointment> = parse_json(appointments_json, "appointments")?;
    let now = parse_datetime(now)?;

    let dto = match verify_booking(&booking, &windows, &appointments, now) {
        Ok(()) => BookingCheckDto {
            available: true,
            reason: None,
        },
        Err(
            e @ (SlotError::InPast(_)
            | SlotError::SlotTaken { .. }
            | SlotError::OutsideAvailability(_)),
        ) => BookingCheckDto {
            available: false,
            reason: Some(e.to_string()),
        },
        Err(e) => return Err(e.to_string()),
    };
    to_json(&dto)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute bookable slots from a full request object.
///
/// `request_json` has `date`, `availabilityWindows`, `existingAppointments`, and
/// `serviceDurationMinutes`. Returns a JSON array of `"HH:MM"` strings.
#[wasm_bindgen(js_name = "computeAvailableSlots")]
pub fn compute_available_slots_js(request_json: &str) -> Result<String, JsValue> {
    compute_request(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Compute bookable slots from separately fetched inputs.
///
/// # Arguments
/// - `date` -- Calendar date (e.g., "2026-03-16")
/// - `windows_json` -- JSON array of availability windows for one business
/// - `appointments_json` -- JSON array of that business's appointments, any status
/// - `service_duration_minutes` -- Length of the service being booked
#[wasm_bindgen(js_name = "computeAvailableSlotsFor")]
pub fn compute_available_slots_for(
    date: &str,
    windows_json: &str,
    appointments_json: &str,
    service_duration_minutes: i32,
) -> Result<String, JsValue> {
    compute_parts(
        date,
        windows_json,
        appointments_json,
        i64::from(service_duration_minutes),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Re-check a booking against the current appointment set.
///
/// Returns `{"available": true}` or `{"available": false, "reason": "..."}`.
/// Malformed input and invalid durations throw instead, so they are never
/// mistaken for a taken slot.
#[wasm_bindgen(js_name = "verifyBooking")]
pub fn verify_booking_js(
    booking_json: &str,
    windows_json: &str,
    appointments_json: &str,
    now: &str,
) -> Result<String, JsValue> {
    check_booking(booking_json, windows_json, appointments_json, now)
        .map_err(|e| JsValue::from_str(&e))
}
