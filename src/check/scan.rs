use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use super::patient::check_patient_schedule;
use super::rules::Flag;
use crate::model::Appointment;

/// Flags raised for one patient, attributed to a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientFlags {
    pub patient_id: String,
    pub scheduler_id: String,
    #[serde(serialize_with = "serialize_messages")]
    pub flags: Vec<Flag>,
}

/// Result of scanning the whole appointment table.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Rows in the table before filtering.
    pub loaded: usize,
    /// Rows inside the lookahead window.
    pub considered: usize,
    /// Patients with at least one flag. Numeric MRNs come first in numeric
    /// order, any other ids follow in lexicographic order.
    pub flagged: Vec<PatientFlags>,
}

impl ScanOutcome {
    /// True when nothing fell inside the lookahead window.
    pub fn nothing_to_check(&self) -> bool {
        self.considered == 0
    }
}

/// Keeps appointments with `now <= timestamp <= now + lookahead_days`.
///
/// A horizon past the last representable date-time leaves the window open
/// at the far end.
pub fn filter_window(
    appointments: &[Appointment],
    now: NaiveDateTime,
    lookahead_days: i64,
) -> Vec<&Appointment> {
    let limit = Duration::try_days(lookahead_days)
        .and_then(|horizon| now.checked_add_signed(horizon))
        .unwrap_or(NaiveDateTime::MAX);
    appointments
        .iter()
        .filter(|a| a.timestamp >= now && a.timestamp <= limit)
        .collect()
}

/// Filters the table to the lookahead window, groups it by patient and
/// checks every patient's schedule.
///
/// Appointments outside the window are dropped before grouping, so they
/// can neither raise nor satisfy a rule. Each patient is attributed to the
/// scheduler of their first row in table order.
pub fn scan_appointments(
    appointments: &[Appointment],
    now: NaiveDateTime,
    lookahead_days: i64,
) -> ScanOutcome {
    let upcoming = filter_window(appointments, now, lookahead_days);
    info!(
        loaded = appointments.len(),
        considered = upcoming.len(),
        lookahead_days,
        "filtered appointments to lookahead window"
    );

    let mut outcome = ScanOutcome {
        loaded: appointments.len(),
        considered: upcoming.len(),
        flagged: Vec::new(),
    };
    if outcome.nothing_to_check() {
        return outcome;
    }

    let mut by_patient: BTreeMap<(u64, &str), Vec<Appointment>> = BTreeMap::new();
    for appointment in upcoming {
        by_patient
            .entry(patient_key(&appointment.patient_id))
            .or_default()
            .push(appointment.clone());
    }

    for ((_, patient_id), patient_appointments) in by_patient {
        let scheduler_id = &patient_appointments[0].scheduler_id;
        if let Some(other) = patient_appointments
            .iter()
            .find(|a| &a.scheduler_id != scheduler_id)
        {
            warn!(
                patient_id,
                scheduler = %scheduler_id,
                other_scheduler = %other.scheduler_id,
                "patient has appointments from more than one scheduler; reporting to the first"
            );
        }

        let flags = check_patient_schedule(&patient_appointments);
        if !flags.is_empty() {
            outcome.flagged.push(PatientFlags {
                patient_id: patient_id.to_string(),
                scheduler_id: scheduler_id.clone(),
                flags,
            });
        }
    }

    info!(flagged = outcome.flagged.len(), "schedule check complete");
    outcome
}

/// Orders MRNs numerically, so "999" comes before "1000".
fn patient_key(patient_id: &str) -> (u64, &str) {
    (patient_id.parse().unwrap_or(u64::MAX), patient_id)
}

fn serialize_messages<S: Serializer>(flags: &[Flag], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(flags.iter().map(|f| f.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::rules::FlagKind;
    use crate::model::{appt, parse_timestamp, AppointmentType};

    fn now() -> NaiveDateTime {
        parse_timestamp("2024-01-01 00:00:00").unwrap()
    }

    #[test]
    fn empty_window_short_circuits() {
        let appointments = vec![appt("1", "5", AppointmentType::Chemo, "2023-12-01 09:00")];
        let outcome = scan_appointments(&appointments, now(), 30);
        assert!(outcome.nothing_to_check());
        assert_eq!(outcome.loaded, 1);
        assert!(outcome.flagged.is_empty());
    }

    #[test]
    fn window_edges_are_inclusive() {
        let appointments = vec![
            appt("1", "5", AppointmentType::Lab, "2024-01-01 00:00"),
            appt("2", "5", AppointmentType::Lab, "2024-01-31 00:00"),
            appt("3", "5", AppointmentType::Lab, "2024-01-31 00:01"),
            appt("4", "5", AppointmentType::Lab, "2023-12-31 23:59"),
        ];
        let ids: Vec<&str> = filter_window(&appointments, now(), 30)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn same_day_lab_and_chemo_end_to_end() {
        let appointments = vec![
            appt("A", "5", AppointmentType::Lab, "2024-01-01"),
            appt("B", "5", AppointmentType::Chemo, "2024-01-01"),
        ];
        let outcome = scan_appointments(&appointments, now(), 60);
        assert_eq!(outcome.flagged.len(), 1);
        let patient = &outcome.flagged[0];
        assert_eq!(patient.patient_id, "5");
        assert_eq!(patient.flags.len(), 1);
        assert_eq!(patient.flags[0].kind, FlagKind::TooSoon);
    }

    #[test]
    fn appointments_outside_window_do_not_satisfy_rules() {
        // The only Lab is before "now", so the Chemo inside the window has none.
        let appointments = vec![
            appt("1", "5", AppointmentType::Lab, "2023-12-30 09:00"),
            appt("2", "5", AppointmentType::Chemo, "2024-01-02 09:00"),
        ];
        let outcome = scan_appointments(&appointments, now(), 60);
        assert_eq!(outcome.considered, 1);
        assert_eq!(outcome.flagged[0].flags[0].kind, FlagKind::Missing);
    }

    #[test]
    fn appointments_outside_window_do_not_raise_flags() {
        let appointments = vec![
            appt("1", "5", AppointmentType::Chemo, "2024-06-01 09:00"),
            appt("2", "6", AppointmentType::Lab, "2024-01-05 09:00"),
            appt("3", "6", AppointmentType::Chemo, "2024-01-07 09:00"),
        ];
        let outcome = scan_appointments(&appointments, now(), 60);
        assert_eq!(outcome.considered, 2);
        assert!(outcome.flagged.is_empty());
    }

    #[test]
    fn patients_are_grouped_and_attributed_to_first_scheduler() {
        let mut first = appt("1", "200", AppointmentType::Chemo, "2024-01-10 09:00");
        first.scheduler_id = "scheduler_B_hasty".to_string();
        let mut second = appt("2", "200", AppointmentType::Lab, "2024-01-03 09:00");
        second.scheduler_id = "scheduler_C_forgetful".to_string();
        let mut third = appt("3", "100", AppointmentType::Chemo, "2024-01-20 09:00");
        third.scheduler_id = "scheduler_C_forgetful".to_string();

        let outcome = scan_appointments(&[first, second, third], now(), 60);
        let patients: Vec<(&str, &str)> = outcome
            .flagged
            .iter()
            .map(|p| (p.patient_id.as_str(), p.scheduler_id.as_str()))
            .collect();
        // patient 200 has a Lab 7 days before Chemo and is clean
        assert_eq!(patients, vec![("100", "scheduler_C_forgetful")]);

        let mut late_lab = appt("4", "200", AppointmentType::Lab, "2024-01-12 09:00");
        late_lab.scheduler_id = "scheduler_A_diligent".to_string();
        let mut chemo = appt("5", "200", AppointmentType::Chemo, "2024-01-10 09:00");
        chemo.scheduler_id = "scheduler_B_hasty".to_string();
        let outcome = scan_appointments(&[late_lab, chemo], now(), 60);
        assert_eq!(outcome.flagged[0].scheduler_id, "scheduler_A_diligent");
    }

    #[test]
    fn huge_lookahead_is_an_open_ended_window() {
        let appointments = vec![
            appt("1", "5", AppointmentType::Chemo, "2024-01-10 09:00"),
            appt("2", "5", AppointmentType::Lab, "2023-12-31 09:00"),
        ];
        for lookahead_days in [1_000_000_000, i64::MAX] {
            assert_eq!(filter_window(&appointments, now(), lookahead_days).len(), 1);
            let outcome = scan_appointments(&appointments, now(), lookahead_days);
            assert_eq!(outcome.considered, 1);
            assert_eq!(outcome.flagged[0].flags[0].kind, FlagKind::Missing);
        }
    }

    #[test]
    fn numeric_mrns_are_reported_in_numeric_order() {
        let appointments = vec![
            appt("1", "1000", AppointmentType::Chemo, "2024-01-10 09:00"),
            appt("2", "TEMP-1", AppointmentType::Chemo, "2024-01-10 09:00"),
            appt("3", "999", AppointmentType::Chemo, "2024-01-10 09:00"),
            appt("4", "20", AppointmentType::Chemo, "2024-01-10 09:00"),
        ];
        let outcome = scan_appointments(&appointments, now(), 60);
        let ids: Vec<&str> = outcome.flagged.iter().map(|p| p.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["20", "999", "1000", "TEMP-1"]);
    }

    #[test]
    fn patient_flags_serialize_as_messages() {
        let appointments = vec![appt("1", "5", AppointmentType::Chemo, "2024-01-10 09:00")];
        let outcome = scan_appointments(&appointments, now(), 60);
        let json = serde_json::to_value(&outcome.flagged).unwrap();
        assert_eq!(json[0]["patient_id"], "5");
        assert_eq!(json[0]["scheduler_id"], "scheduler_A_diligent");
        assert_eq!(
            json[0]["flags"][0],
            "Critical Error: A Chemo on 2024-01-10 has no Lab test scheduled within the prior 7 days."
        );
    }
}
