use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use schedule_check::generate::Personality;
use schedule_check::model::parse_timestamp;

/// Generate synthetic appointment schedules and check them for rule violations.
#[derive(Parser, Debug)]
#[command(name = "schedule-check", version, about)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true, env = "SCHEDULE_CHECK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check upcoming appointments and print a report per scheduler
    Check(CheckArgs),
    /// Generate a synthetic appointment table
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Appointment table to check
    #[arg(long, env = "SCHEDULE_CHECK_INPUT")]
    pub input: Option<PathBuf>,

    /// Only appointments within this many days from now are checked
    #[arg(long, env = "SCHEDULE_CHECK_LOOKAHEAD_DAYS")]
    pub lookahead_days: Option<i64>,

    /// Override the current time, e.g. "2024-01-01 08:00:00"
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Where to write the generated table
    #[arg(long, env = "SCHEDULE_CHECK_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of patients to generate
    #[arg(long)]
    pub patients: Option<usize>,

    /// RNG seed, for reproducible datasets
    #[arg(long, env = "SCHEDULE_CHECK_SEED")]
    pub seed: Option<u64>,

    /// Date the journeys are scheduled from (defaults to today)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Restrict schedulers to these personalities (repeatable)
    #[arg(long = "personality")]
    pub personalities: Vec<Personality>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value).map_err(|e| e.to_string())
}
