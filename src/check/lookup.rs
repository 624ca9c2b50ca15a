use chrono::{Duration, NaiveDateTime};

use crate::model::{Appointment, AppointmentType};

/// Finds the earliest appointment of `kind` within `window_days` either side
/// of `reference` (both ends inclusive).
///
/// `appointments` must belong to a single patient; order does not matter.
/// A match after the reference is returned just as readily as one before it,
/// so callers check direction themselves.
pub fn find_related_appointment<'a>(
    appointments: &'a [Appointment],
    kind: &AppointmentType,
    reference: NaiveDateTime,
    window_days: i64,
) -> Option<&'a Appointment> {
    let window = Duration::days(window_days);
    let start = reference - window;
    let end = reference + window;

    appointments
        .iter()
        .filter(|a| &a.appointment_type == kind)
        .filter(|a| a.timestamp >= start && a.timestamp <= end)
        .min_by_key(|a| a.timestamp)
}
