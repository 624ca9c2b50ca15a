use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::error::{Result, ScheduleError};

/// Format used when writing appointment timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Appointment categories known to the rule table and the generator.
///
/// The set of categories in real data is open-ended; anything not listed
/// here is kept verbatim in `Other` and never triggers a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AppointmentType {
    Lab,
    Chemo,
    Mammogram,
    OncologyVisit,
    CtSimulation,
    RadiationTherapy,
    PetCt,
    DoctorVisit,
    CtChestAbdomenPelvis,
    BoneScan,
    Other(String),
}

impl AppointmentType {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentType::Lab => "Lab",
            AppointmentType::Chemo => "Chemo",
            AppointmentType::Mammogram => "Mammogram",
            AppointmentType::OncologyVisit => "Oncology Visit",
            AppointmentType::CtSimulation => "CT Simulation",
            AppointmentType::RadiationTherapy => "Radiation Therapy",
            AppointmentType::PetCt => "PET-CT",
            AppointmentType::DoctorVisit => "Doctor Visit",
            AppointmentType::CtChestAbdomenPelvis => "CT Chest/Abdomen/Pelvis",
            AppointmentType::BoneScan => "Bone Scan",
            AppointmentType::Other(label) => label,
        }
    }

    /// Maps a table label onto a known category, falling back to `Other`.
    pub fn from_label(value: &str) -> Self {
        match value.trim() {
            "Lab" => AppointmentType::Lab,
            "Chemo" => AppointmentType::Chemo,
            "Mammogram" => AppointmentType::Mammogram,
            "Oncology Visit" => AppointmentType::OncologyVisit,
            "CT Simulation" => AppointmentType::CtSimulation,
            "Radiation Therapy" => AppointmentType::RadiationTherapy,
            "PET-CT" => AppointmentType::PetCt,
            "Doctor Visit" => AppointmentType::DoctorVisit,
            "CT Chest/Abdomen/Pelvis" => AppointmentType::CtChestAbdomenPelvis,
            "Bone Scan" => AppointmentType::BoneScan,
            other => AppointmentType::Other(other.to_string()),
        }
    }
}

impl FromStr for AppointmentType {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(AppointmentType::from_label(value))
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AppointmentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single scheduled appointment, as loaded from or written to the
/// appointment table. Column names follow the upstream extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    #[serde(rename = "APPT_ID")]
    pub id: String,
    #[serde(rename = "PATIENT_MRN")]
    pub patient_id: String,
    #[serde(rename = "APPT_TYPE")]
    pub appointment_type: AppointmentType,
    #[serde(rename = "APPT_DTTM", serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "SCHEDULER_ID")]
    pub scheduler_id: String,
}

impl Appointment {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Parses a date-time cell. A bare date is taken as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ACCEPTED_DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ScheduleError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
pub(crate) fn appt(id: &str, patient: &str, kind: AppointmentType, when: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: patient.to_string(),
        appointment_type: kind,
        timestamp: parse_timestamp(when).unwrap(),
        scheduler_id: "scheduler_A_diligent".to_string(),
    }
}
