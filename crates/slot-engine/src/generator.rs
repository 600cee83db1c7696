//! Generate candidate start times inside one availability window.
//!
//! Candidates form a single arithmetic progression starting at the window's
//! daily start, stepping by the service granularity, and stopping at the last
//! start that still lets the whole service finish by the daily end.

use crate::model::{AvailabilityWindow, ServiceDuration, TimeOfDay};

/// Produce the ordered candidate start times for `duration` within `window`.
///
/// The step is `min(30, duration)` minutes, so short services are not forced onto
/// a half-hour grid. A window whose daily end is not after its daily start, or
/// one shorter than the service, yields no candidates.
pub fn generate_candidates(window: &AvailabilityWindow, duration: ServiceDuration) -> Vec<TimeOfDay> {
    let day_start = window.daily_start_time.minutes();
    let day_end = window.daily_end_time.minutes();
    if day_start >= day_end {
        return Vec::new();
    }

    let length = duration.minutes();
    (day_start..)
        .step_by(duration.granularity() as usize)
        .take_while(|start| start.saturating_add(length) <= day_end)
        .filter_map(TimeOfDay::from_minutes)
        .collect()
}
