//! Monthly roster CLI.
//!
//! Usage:
//!   u-roster 2024-01-01
//!   u-roster 2024-03 --config roster.json --relaxation 2 --show-off
//!   u-roster 2024-03 --json > roster.json

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use u_roster::audit::RosterStats;
use u_roster::config::RosterConfig;
use u_roster::milp::{GoodLpSolver, RosterModelBuilder, RosterOutcome};
use u_roster::models::MonthCalendar;
use u_roster::{logging, Result};

#[derive(Parser)]
#[command(name = "u-roster")]
#[command(about = "Build and solve a monthly doctor shift roster")]
struct Cli {
    /// Any date in the target month (YYYY-MM-DD) or the month itself (YYYY-MM)
    date: String,

    /// JSON roster configuration (default: built-in obstetrics roster)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Slack added to the per-doctor maximum shift count
    #[arg(long)]
    relaxation: Option<u32>,

    /// Minimum doctors per shift
    #[arg(long)]
    min_per_shift: Option<u32>,

    /// Maximum doctors per shift
    #[arg(long)]
    max_per_shift: Option<u32>,

    /// Monthly shift ceiling per doctor
    #[arg(long)]
    max_shifts: Option<u32>,

    /// Full rest days after a night shift
    #[arg(long)]
    rest_length: Option<u32>,

    /// Also print the slots each doctor is not working
    #[arg(long)]
    show_off: bool,

    /// Print the roster as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "roster run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when no roster exists for the given policy or the
/// solved roster fails its audit.
fn run(cli: &Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => RosterConfig::from_file(path)?,
        None => RosterConfig::obstetrics(),
    };
    let policy = &mut config.policy;
    if let Some(v) = cli.relaxation {
        policy.relaxation = v;
    }
    if let Some(v) = cli.min_per_shift {
        policy.min_doctors_per_shift = v;
    }
    if let Some(v) = cli.max_per_shift {
        policy.max_doctors_per_shift = v;
    }
    if let Some(v) = cli.max_shifts {
        policy.max_shifts_per_doctor = v;
    }
    if let Some(v) = cli.rest_length {
        policy.rest_length = v;
    }

    let calendar = MonthCalendar::resolve(&cli.date)?;
    let registry = config.registry()?;
    let unavailable = config.unavailability()?;
    info!(
        year = calendar.year(),
        month = calendar.month(),
        doctors = registry.doctor_count(),
        "building roster"
    );

    let builder = RosterModelBuilder::new(&registry, &calendar)
        .with_policy(config.policy.clone())
        .with_unavailability(unavailable);
    let roster = match builder.solve(&GoodLpSolver::new())? {
        RosterOutcome::Solved(roster) => roster,
        RosterOutcome::Infeasible => {
            println!("infeasible: no roster satisfies the rules for this policy");
            return Ok(false);
        }
        RosterOutcome::Unbounded => {
            println!("unbounded: the fairness objective has no optimum");
            return Ok(false);
        }
    };

    for v in &roster.violations {
        error!(kind = ?v.violation_type, entity = %v.entity_id, "{}", v.message);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&roster)?);
    } else {
        for record in roster.records(&calendar, cli.show_off) {
            let hours = config.shift_hours.of(record.shift);
            println!("{}", record.with_hours(hours));
        }
        let stats = RosterStats::calculate(&roster, &registry);
        for (department, load) in &stats.by_department {
            info!(
                department = %department,
                floor = load.floor,
                ceiling = load.ceiling,
                total = load.total,
                "department load"
            );
        }
        for doctor in registry.doctors() {
            info!(
                doctor = %doctor,
                shifts = stats.load_by_doctor.get(doctor).copied().unwrap_or(0),
                night_share = stats.night_share(doctor),
                "doctor load"
            );
        }
    }

    Ok(roster.is_valid())
}
