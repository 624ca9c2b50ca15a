use csv::Writer;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::Appointment;

/// Writes appointments as CSV with the standard column header.
pub fn write_appointments<W: Write>(writer: W, appointments: &[Appointment]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    for appointment in appointments {
        wtr.serialize(appointment)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Creates (or truncates) `csv_path` and writes the appointment table to it.
pub fn export_appointments_to_csv<P: AsRef<Path>>(
    csv_path: P,
    appointments: &[Appointment],
) -> Result<()> {
    let file = std::fs::File::create(csv_path)?;
    write_appointments(file, appointments)
}
