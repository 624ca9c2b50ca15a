pub mod rules;
pub mod lookup;
pub mod patient;
pub mod scan;

pub use rules::{Flag, FlagKind, Rule, RuleMessages, RULES};
pub use lookup::find_related_appointment;
pub use patient::check_patient_schedule;
pub use scan::{scan_appointments, PatientFlags, ScanOutcome};
