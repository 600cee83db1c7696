//! Select the availability windows that apply on a calendar date.

use chrono::NaiveDate;

use crate::model::AvailabilityWindow;

/// Return the windows whose inclusive `[start_date, end_date]` range covers `date`.
///
/// Input order is preserved. A date outside every window yields an empty list.
pub fn select_windows(windows: &[AvailabilityWindow], date: NaiveDate) -> Vec<&AvailabilityWindow> {
    windows.iter().filter(|w| w.covers(date)).collect()
}
