use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::generate::{Personality, MAX_PATIENTS};

pub const DEFAULT_TABLE: &str = "generated_appointments_v5.csv";
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 120;
pub const DEFAULT_PATIENTS: usize = 100;

/// Settings loaded from an optional TOML file. Every field has a default,
/// so an empty or partial file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub check: CheckSettings,
    pub generate: GenerateSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Appointment table to validate
    pub input: PathBuf,
    /// Days after "now" to include in the scan
    pub lookahead_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Where the generated table is written
    pub output: PathBuf,
    pub patients: usize,
    /// Fixed RNG seed; a random one is drawn and logged when unset
    pub seed: Option<u64>,
    /// Personalities to draw schedulers from (diligent, hasty, forgetful)
    pub personalities: Vec<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_TABLE),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_TABLE),
            patients: DEFAULT_PATIENTS,
            seed: None,
            personalities: Vec::new(),
        }
    }
}

impl GenerateSettings {
    pub fn parsed_personalities(&self) -> Result<Vec<Personality>> {
        self.personalities
            .iter()
            .map(|p| p.parse().map_err(ScheduleError::Config))
            .collect()
    }
}

/// Rejects patient counts the generator cannot give distinct MRNs to.
pub fn validate_patients(patients: usize) -> Result<()> {
    if patients == 0 {
        return Err(ScheduleError::Config("patients must be at least 1".to_string()));
    }
    if patients > MAX_PATIENTS {
        return Err(ScheduleError::Config(format!(
            "patients must be at most {} (got {})",
            MAX_PATIENTS, patients
        )));
    }
    Ok(())
}

impl Settings {
    /// Loads settings from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml(&content)?;
        debug!(path = %path.display(), "loaded config file");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| ScheduleError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.check.lookahead_days < 0 {
            return Err(ScheduleError::Config(format!(
                "lookahead_days must not be negative (got {})",
                self.check.lookahead_days
            )));
        }
        validate_patients(self.generate.patients)?;
        self.generate.parsed_personalities()?;
        Ok(())
    }
}
