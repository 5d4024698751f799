//! pb-server: Petbook scheduling service binary
//!
//! Usage:
//!   pb-server                            - Start the HTTP API
//!   pb-server --check <file>             - Validate a calendar group file
//!   pb-server --slots <file> <from> <to> - Print bookable timeslots as JSON
//!   pb-server --help                     - Show help

mod error;

use std::path::PathBuf;

use chrono::NaiveDate;
use pb_core::Config;
use pb_schedule::{load_calendar_group, materialize_timeslots, validate_for};
use tracing_subscriber::EnvFilter;

use crate::error::{ArgError, Result};

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Server mode (HTTP API)
    Server,
    /// Validate a calendar group file and exit
    Check(PathBuf),
    /// Materialize timeslots for a calendar group file and exit
    Slots {
        path: PathBuf,
        from: NaiveDate,
        to: NaiveDate,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = match parse_args(std::env::args().skip(1)) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run `pb-server --help` for usage.");
            std::process::exit(2);
        }
    };

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("pb-server {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging (stderr, so JSON output on stdout stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    match mode {
        RunMode::Check(path) => run_check(&config, path),
        RunMode::Slots { path, from, to } => run_slots(&config, path, from, to),
        RunMode::Server => run_server(config).await,
        RunMode::Help | RunMode::Version => Ok(()),
    }
}

/// Parse command line arguments (program name already skipped)
fn parse_args<I>(args: I) -> Result<RunMode>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    let Some(first) = args.next() else {
        return Ok(RunMode::Server);
    };

    match first.as_str() {
        "--help" | "-h" => Ok(RunMode::Help),
        "--version" | "-v" => Ok(RunMode::Version),
        "--check" => {
            let path = args.next().ok_or(ArgError::MissingPath("--check"))?;
            Ok(RunMode::Check(PathBuf::from(path)))
        }
        "--slots" => {
            let path = args.next().ok_or(ArgError::MissingPath("--slots"))?;
            let (Some(from), Some(to)) = (args.next(), args.next()) else {
                return Err(ArgError::MissingDates("--slots"));
            };
            Ok(RunMode::Slots {
                path: PathBuf::from(path),
                from: parse_date(&from)?,
                to: parse_date(&to)?,
            })
        }
        other => Err(ArgError::Unknown(other.to_string())),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|_| ArgError::InvalidDate(value.to_string()))
}

/// Print help message
fn print_help() {
    println!("pb-server - Petbook scheduling service");
    println!();
    println!("Usage:");
    println!("  pb-server                            Start the HTTP API");
    println!("  pb-server --check <file>             Validate a calendar group TOML file");
    println!("  pb-server --slots <file> <from> <to> Print bookable timeslots as JSON");
    println!("  pb-server --help                     Show this help message");
    println!("  pb-server --version                  Show version");
    println!();
    println!("Configuration is read from ./petbook.toml when present.");
    println!();
    println!("Environment Variables:");
    println!("  API_PORT                     HTTP API port (default: 3000)");
    println!("  API_KEY                      Bearer key for /api endpoints (optional)");
    println!("  API_ALLOWED_ORIGINS          Comma-separated CORS origins (default: any)");
    println!("  BOOKING_HORIZON_MONTHS       Latest bookable end date, in months (default: 3)");
    println!("  SCHEDULE_UTC_OFFSET_MINUTES  Wall-clock offset from UTC (default: 0)");
    println!("  MAX_QUERY_DAYS               Longest timeslot query range (default: 93)");
    println!("  RUST_LOG                     Log filter");
}

/// Validate a calendar group file, exiting with status 1 when it is blocked
fn run_check(config: &Config, path: PathBuf) -> anyhow::Result<()> {
    let group = load_calendar_group(&path)?;
    let report = validate_for(&group.settings, &config.schedule);

    for error in &report.field_errors {
        println!("error: {}", error.message);
    }
    if let Some(conflict) = &report.conflict {
        println!("conflict: {}", conflict.message);
    }
    for note in &report.notes {
        println!("note: {}", note.message);
    }

    if !report.is_ok() {
        std::process::exit(1);
    }

    println!(
        "{}: {} settings OK",
        group.name,
        group.settings.len()
    );
    Ok(())
}

/// Print the bookable timeslots of a calendar group file as JSON
fn run_slots(config: &Config, path: PathBuf, from: NaiveDate, to: NaiveDate) -> anyhow::Result<()> {
    if to < from {
        anyhow::bail!("end date {} is before start date {}", to, from);
    }

    let group = load_calendar_group(&path)?;
    let slots = materialize_timeslots(&group.settings, from, to, config.schedule.local_now());
    tracing::info!("{} timeslots between {} and {}", slots.len(), from, to);

    println!("{}", serde_json::to_string_pretty(&slots)?);
    Ok(())
}

/// Run server mode
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting pb-server...");
    tracing::info!(
        "Booking horizon: {} months, UTC offset: {} minutes",
        config.schedule.booking_horizon_months,
        config.schedule.utc_offset_minutes
    );
    if config.api.key.is_none() {
        tracing::warn!("API_KEY not set, /api endpoints are unauthenticated");
    }

    let handle = tokio::spawn(async move {
        if let Err(e) = pb_api::start_server(config).await {
            tracing::error!("HTTP API error: {}", e);
        }
    });

    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    handle.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults_to_server() {
        assert_eq!(parse_args(args(&[])), Ok(RunMode::Server));
        assert_eq!(parse_args(args(&["-h"])), Ok(RunMode::Help));
        assert_eq!(parse_args(args(&["--version"])), Ok(RunMode::Version));
    }

    #[test]
    fn test_parse_args_check() {
        assert_eq!(
            parse_args(args(&["--check", "group.toml"])),
            Ok(RunMode::Check(PathBuf::from("group.toml")))
        );
        assert_eq!(
            parse_args(args(&["--check"])),
            Err(ArgError::MissingPath("--check"))
        );
    }

    #[test]
    fn test_parse_args_slots() {
        let mode = parse_args(args(&["--slots", "group.toml", "2024-01-01", "2024-01-31"]));
        assert_eq!(
            mode,
            Ok(RunMode::Slots {
                path: PathBuf::from("group.toml"),
                from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            })
        );

        assert_eq!(
            parse_args(args(&["--slots", "group.toml", "2024-01-01"])),
            Err(ArgError::MissingDates("--slots"))
        );
        assert_eq!(
            parse_args(args(&["--slots", "group.toml", "2024-13-01", "2024-01-31"])),
            Err(ArgError::InvalidDate("2024-13-01".to_string()))
        );
    }

    #[test]
    fn test_parse_args_unknown() {
        assert_eq!(
            parse_args(args(&["--cli"])),
            Err(ArgError::Unknown("--cli".to_string()))
        );
    }
}
