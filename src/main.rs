mod cli;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use tracing::info;

use schedule_check::check::scan_appointments;
use schedule_check::config::{validate_patients, Settings};
use schedule_check::display::{print_report, write_json_report};
use schedule_check::generate::{export_appointments_to_csv, generate_appointments, GeneratorConfig};
use schedule_check::parser::load_appointments;
use schedule_check::ScheduleError;

use crate::cli::{CheckArgs, Cli, Command, GenerateArgs, ReportFormat};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Check(args) => run_check(&settings, args),
        Command::Generate(args) => run_generate(&settings, args),
    }
}

fn run_check(settings: &Settings, args: CheckArgs) -> Result<()> {
    let input = args.input.unwrap_or_else(|| settings.check.input.clone());
    let lookahead_days = args.lookahead_days.unwrap_or(settings.check.lookahead_days);
    if lookahead_days < 0 {
        bail!("--lookahead-days must not be negative (got {})", lookahead_days);
    }
    let text = args.format == ReportFormat::Text;

    let appointments = match load_appointments(&input) {
        Ok(appointments) => appointments,
        Err(e @ ScheduleError::InputNotFound(_)) => {
            println!("Error: {}.", e);
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to load '{}'", input.display()));
        }
    };
    info!(count = appointments.len(), input = %input.display(), "loaded appointments");
    if text {
        println!(
            "Loaded {} total appointments from '{}'.",
            appointments.len(),
            input.display()
        );
    }

    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    let outcome = scan_appointments(&appointments, now, lookahead_days);
    if text {
        println!(
            "Filtered to {} appointments scheduled in the next {} days.",
            outcome.considered, lookahead_days
        );
    }

    if outcome.nothing_to_check() {
        if text {
            println!("No upcoming appointments found in the specified date range. Exiting.");
        } else {
            write_json_report(&mut io::stdout().lock(), &[])?;
        }
        return Ok(());
    }

    match args.format {
        ReportFormat::Text => print_report(&outcome.flagged)?,
        ReportFormat::Json => write_json_report(&mut io::stdout().lock(), &outcome.flagged)?,
    }
    Ok(())
}

fn run_generate(settings: &Settings, args: GenerateArgs) -> Result<()> {
    let output = args.output.unwrap_or_else(|| settings.generate.output.clone());
    let patients = args.patients.unwrap_or(settings.generate.patients);
    validate_patients(patients).context("invalid --patients")?;
    let personalities = if args.personalities.is_empty() {
        settings.generate.parsed_personalities()?
    } else {
        args.personalities
    };

    let seed = args
        .seed
        .or(settings.generate.seed)
        .unwrap_or_else(rand::random);
    info!(seed, patients, "starting longitudinal patient journey simulation");
    let mut rng = StdRng::seed_from_u64(seed);

    let config = GeneratorConfig {
        patients,
        today: args.today.unwrap_or_else(|| Local::now().date_naive()),
        personalities,
    };
    let appointments = generate_appointments(&mut rng, &config);

    export_appointments_to_csv(&output, &appointments)
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    println!(
        "Successfully generated {} longitudinal appointments for {} patients (seed {}).",
        appointments.len(),
        patients,
        seed
    );
    println!("Output saved to '{}'", output.display());

    if let Some(first) = appointments.first() {
        println!("\n--- Data Preview (MRN {}) ---", first.patient_id);
        for appointment in appointments
            .iter()
            .take_while(|a| a.patient_id == first.patient_id)
        {
            println!(
                "  {}  {:<18} {}  {}",
                appointment.id,
                appointment.appointment_type.as_str(),
                appointment.timestamp.format(schedule_check::model::TIMESTAMP_FORMAT),
                appointment.scheduler_id
            );
        }
    }

    Ok(())
}
