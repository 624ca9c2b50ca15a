//! Synthetic oncology appointment schedules and a rule-based checker that
//! flags scheduling mistakes in them.
//!
//! The checker loads an appointment table, keeps the appointments inside a
//! lookahead window, groups them by patient and applies a fixed table of
//! pairwise temporal rules (Lab before Chemo, Mammogram before the follow-up
//! visit, CT Simulation before Radiation Therapy). The generator produces
//! seeded longitudinal journeys booked by schedulers of varying diligence.

pub mod check;
pub mod config;
pub mod display;
pub mod error;
pub mod generate;
pub mod model;
pub mod parser;

pub use error::{Result, ScheduleError};
pub use model::{Appointment, AppointmentType};
