use csv::{Reader, StringRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::model::{parse_timestamp, Appointment, AppointmentType};

pub const COLUMN_ID: &str = "APPT_ID";
pub const COLUMN_PATIENT: &str = "PATIENT_MRN";
pub const COLUMN_TYPE: &str = "APPT_TYPE";
pub const COLUMN_TIMESTAMP: &str = "APPT_DTTM";
pub const COLUMN_SCHEDULER: &str = "SCHEDULER_ID";

/// Column positions resolved from the header row. Columns may appear in any
/// order and extra columns are ignored.
struct Columns {
    id: usize,
    patient: usize,
    kind: usize,
    timestamp: usize,
    scheduler: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ScheduleError::InvalidRecord {
                    row: 1,
                    reason: format!("missing required column '{}'", name),
                })
        };

        Ok(Columns {
            id: find(COLUMN_ID)?,
            patient: find(COLUMN_PATIENT)?,
            kind: find(COLUMN_TYPE)?,
            timestamp: find(COLUMN_TIMESTAMP)?,
            scheduler: find(COLUMN_SCHEDULER)?,
        })
    }
}

/// Loads the full appointment table from a CSV file.
///
/// A missing file is reported as [`ScheduleError::InputNotFound`] so the
/// caller can print a friendly message. Any malformed row (blank required
/// field, unparseable timestamp, duplicate appointment id) rejects the
/// whole load.
pub fn load_appointments<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Appointment>> {
    let csv_path = csv_path.as_ref();
    if !csv_path.exists() {
        return Err(ScheduleError::InputNotFound(csv_path.to_path_buf()));
    }

    let reader = Reader::from_path(csv_path)?;
    read_appointments(reader)
}

/// Reads appointments from any CSV source with a header row.
pub fn read_appointments<R: Read>(mut reader: Reader<R>) -> Result<Vec<Appointment>> {
    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut appointments = Vec::new();
    let mut seen_ids = HashSet::new();

    for result in reader.records() {
        let record = result?;
        let row = record.position().map(|p| p.line()).unwrap_or(0);

        let field = |index: usize, name: &str| -> Result<String> {
            let value = record.get(index).unwrap_or("").trim();
            if value.is_empty() {
                return Err(ScheduleError::InvalidRecord {
                    row,
                    reason: format!("empty {} value", name),
                });
            }
            Ok(value.to_string())
        };

        let id = field(columns.id, COLUMN_ID)?;
        let patient_id = field(columns.patient, COLUMN_PATIENT)?;
        let raw_type = field(columns.kind, COLUMN_TYPE)?;
        let raw_timestamp = field(columns.timestamp, COLUMN_TIMESTAMP)?;
        let scheduler_id = field(columns.scheduler, COLUMN_SCHEDULER)?;

        let timestamp = parse_timestamp(&raw_timestamp).map_err(|e| ScheduleError::InvalidRecord {
            row,
            reason: e.to_string(),
        })?;

        if !seen_ids.insert(id.clone()) {
            return Err(ScheduleError::InvalidRecord {
                row,
                reason: format!("duplicate appointment id '{}'", id),
            });
        }

        let appointment_type = AppointmentType::from_label(&raw_type);
        if let AppointmentType::Other(label) = &appointment_type {
            debug!(row, label = %label, "unrecognised appointment type");
        }

        appointments.push(Appointment {
            id,
            patient_id,
            appointment_type,
            timestamp,
            scheduler_id,
        });
    }

    Ok(appointments)
}
