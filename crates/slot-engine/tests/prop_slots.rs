//! Property-based tests for slot computation using proptest.
//!
//! These tests verify invariants that should hold for *any* windows,
//! appointments, and service duration, not just the examples in
//! `availability_tests.rs`.

use chrono::NaiveDate;
use proptest::prelude::*;
use slot_engine::{
    candidate_slots, compute_available_slots, generate_candidates, select_windows, Appointment,
    AppointmentStatus, AvailabilityWindow, OccupiedInterval, ServiceDuration, TimeOfDay,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn arb_time() -> impl Strategy<Value = TimeOfDay> {
    (0u32..24 * 60).prop_map(|m| TimeOfDay::from_minutes(m).unwrap())
}

/// Date offsets around the target so some windows miss it.
fn arb_window() -> impl Strategy<Value = AvailabilityWindow> {
    (-5i64..=5, 0i64..=10, arb_time(), arb_time()).prop_map(|(offset, span, a, b)| {
        let start_date = target_date() + chrono::Duration::days(offset);
        AvailabilityWindow {
            business_id: 1,
            start_date,
            end_date: start_date + chrono::Duration::days(span),
            daily_start_time: a.min(b),
            daily_end_time: a.max(b),
        }
    })
}

fn arb_status() -> impl Strategy<Value = AppointmentStatus> {
    prop_oneof![
        Just(AppointmentStatus::Pending),
        Just(AppointmentStatus::Confirmed),
        Just(AppointmentStatus::Cancelled),
        Just(AppointmentStatus::Completed),
    ]
}

/// Appointments on the day before, of, or after the target date.
fn arb_appointment() -> impl Strategy<Value = Appointment> {
    (-1i64..=1, arb_time(), 5u32..=180, arb_status()).prop_map(|(offset, start, duration, status)| {
        let d = target_date() + chrono::Duration::days(offset);
        Appointment {
            business_id: 1,
            service_id: 1,
            date_time: start.on(d),
            duration_minutes: duration,
            status,
        }
    })
}

fn arb_duration() -> impl Strategy<Value = i64> {
    1i64..=240
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn computation_is_idempotent(
        windows in prop::collection::vec(arb_window(), 0..5),
        appointments in prop::collection::vec(arb_appointment(), 0..8),
        duration in arb_duration(),
    ) {
        let first = compute_available_slots(target_date(), &windows, &appointments, duration).unwrap();
        let second = compute_available_slots(target_date(), &windows, &appointments, duration).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn returned_slots_never_overlap_active_appointments(
        windows in prop::collection::vec(arb_window(), 0..5),
        appointments in prop::collection::vec(arb_appointment(), 0..8),
        duration in arb_duration(),
    ) {
        let slots = compute_available_slots(target_date(), &windows, &appointments, duration).unwrap();
        let length = ServiceDuration::new(duration).unwrap();
        for slot in slots {
            let interval = OccupiedInterval::new(slot.on(target_date()), length).unwrap();
            for appt in appointments.iter().filter(|a| a.is_blocking()) {
                prop_assert!(
                    !interval.overlaps(&appt.occupied().unwrap()),
                    "slot {} overlaps appointment at {}",
                    slot,
                    appt.date_time
                );
            }
        }
    }

    #[test]
    fn all_cancelled_matches_unfiltered(
        windows in prop::collection::vec(arb_window(), 0..5),
        appointments in prop::collection::vec(arb_appointment(), 0..8),
        duration in arb_duration(),
    ) {
        let cancelled: Vec<Appointment> = appointments
            .into_iter()
            .map(|mut a| {
                a.status = AppointmentStatus::Cancelled;
                a
            })
            .collect();
        let got = compute_available_slots(target_date(), &windows, &cancelled, duration).unwrap();
        let expected = candidate_slots(target_date(), &windows, ServiceDuration::new(duration).unwrap());
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn result_is_a_subsequence_of_candidates(
        windows in prop::collection::vec(arb_window(), 0..5),
        appointments in prop::collection::vec(arb_appointment(), 0..8),
        duration in arb_duration(),
    ) {
        let got = compute_available_slots(target_date(), &windows, &appointments, duration).unwrap();
        let all = candidate_slots(target_date(), &windows, ServiceDuration::new(duration).unwrap());
        let mut remaining = all.iter();
        for slot in &got {
            prop_assert!(
                remaining.any(|c| c == slot),
                "slot {} is not an in-order candidate",
                slot
            );
        }
    }

    #[test]
    fn candidates_increase_by_granularity_and_fit(
        window in arb_window(),
        duration in arb_duration(),
    ) {
        let length = ServiceDuration::new(duration).unwrap();
        let candidates = generate_candidates(&window, length);

        if let Some(first) = candidates.first() {
            prop_assert_eq!(*first, window.daily_start_time);
        }
        for pair in candidates.windows(2) {
            prop_assert_eq!(pair[1].minutes() - pair[0].minutes(), length.granularity());
        }
        for c in &candidates {
            prop_assert!(c.minutes() + length.minutes() <= window.daily_end_time.minutes());
        }
        // The next step would not fit.
        if let Some(last) = candidates.last() {
            prop_assert!(
                last.minutes() + length.granularity() + length.minutes()
                    > window.daily_end_time.minutes()
            );
        }
    }

    #[test]
    fn selected_windows_all_cover_the_date(
        windows in prop::collection::vec(arb_window(), 0..8),
    ) {
        let selected = select_windows(&windows, target_date());
        let expected = windows.iter().filter(|w| w.start_date <= target_date() && target_date() <= w.end_date).count();
        prop_assert_eq!(selected.len(), expected);
        prop_assert!(selected.iter().all(|w| w.covers(target_date())));
    }

    #[test]
    fn non_positive_duration_always_errors(
        windows in prop::collection::vec(arb_window(), 0..3),
        duration in -500i64..=0,
    ) {
        prop_assert!(compute_available_slots(target_date(), &windows, &[], duration).is_err());
    }
}
