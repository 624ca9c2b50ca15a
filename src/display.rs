use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::check::PatientFlags;

/// Groups flagged patients by the scheduler responsible for them.
pub fn group_by_scheduler(flagged: &[PatientFlags]) -> BTreeMap<&str, Vec<&PatientFlags>> {
    let mut groups: BTreeMap<&str, Vec<&PatientFlags>> = BTreeMap::new();
    for patient in flagged {
        groups
            .entry(patient.scheduler_id.as_str())
            .or_default()
            .push(patient);
    }
    groups
}

/// Writes one review "email" per scheduler listing each flagged patient and
/// the reasons it was flagged.
pub fn write_report<W: Write>(out: &mut W, flagged: &[PatientFlags]) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(50))?;
    writeln!(out, "--- GENERATING SCHEDULER ERROR REPORTS ---")?;
    writeln!(out, "{}\n", "=".repeat(50))?;

    if flagged.is_empty() {
        writeln!(out, "No scheduling errors were found in the upcoming appointments.")?;
        return Ok(());
    }

    for (scheduler_id, patients) in group_by_scheduler(flagged) {
        writeln!(out, "--- Email Report for: {} ---", scheduler_id)?;
        writeln!(out, "Subject: Daily Patient Schedule Review Required\n")?;
        writeln!(out, "Hello,")?;
        writeln!(
            out,
            "The automated monitoring system has flagged the following patient schedules for your review:\n"
        )?;

        for patient in patients {
            writeln!(out, "  - PATIENT MRN: {}", patient.patient_id)?;
            for flag in &patient.flags {
                writeln!(out, "    - Reason: {}", flag)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "Thank you,\nClinical Informatics System\n")?;
        writeln!(out, "--- End of Report ---\n")?;
    }

    Ok(())
}

/// Writes the flagged patients as a pretty-printed JSON array.
pub fn write_json_report<W: Write>(out: &mut W, flagged: &[PatientFlags]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, flagged)?;
    writeln!(out)
}

/// Prints the text report to stdout.
pub fn print_report(flagged: &[PatientFlags]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_report(&mut lock, flagged)
}
