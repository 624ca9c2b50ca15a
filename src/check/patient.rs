use std::collections::HashSet;

use super::lookup::find_related_appointment;
use super::rules::{rules_for, Flag};
use crate::model::Appointment;

/// Checks one patient's appointments against the rule table.
///
/// Every appointment is checked, not only the latest of its type. Flags are
/// returned without duplicates, in the order they were first raised
/// (chronological by trigger). Empty input gives no flags.
pub fn check_patient_schedule(appointments: &[Appointment]) -> Vec<Flag> {
    let mut sorted: Vec<&Appointment> = appointments.iter().collect();
    sorted.sort_by_key(|a| a.timestamp);

    let mut seen = HashSet::new();
    let mut flags = Vec::new();

    for current in sorted {
        for rule in rules_for(&current.appointment_type) {
            let related = find_related_appointment(
                appointments,
                &rule.related,
                current.timestamp,
                rule.window_days,
            );
            if let Some(flag) = rule.evaluate(current, related) {
                if seen.insert(flag.clone()) {
                    flags.push(flag);
                }
            }
        }
    }

    flags
}
