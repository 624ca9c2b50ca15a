pub mod plans;
pub mod personality;
pub mod journey;
pub mod export;

pub use personality::Personality;
pub use journey::{generate_appointments, GeneratorConfig, MAX_PATIENTS};
pub use export::export_appointments_to_csv;
