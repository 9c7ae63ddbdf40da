//! `dst` CLI — inspect daylight-saving transitions from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # List the zones in the catalog
//! dst zones
//!
//! # Transition dates of 2017 for every zone, or for one
//! dst transitions --year 2017
//! dst transitions --year 2017 --timezone "Central Europe Standard Time"
//!
//! # First transition on or after an instant
//! dst next --timezone "Central Europe Standard Time" --asof 2017-03-27
//!
//! # Hours in a calendar day (23, 24 or 25)
//! dst day-length --timezone Europe/Budapest --date 2017-10-29
//!
//! # Cross-check a zone's rules against tzdata
//! dst verify --timezone "Eastern Standard Time" --year 2024
//!
//! # Use another catalog, emit JSON
//! DST_CATALOG=zones.json dst --json next -t "My Zone" --asof 2030-01-01T00:00
//! ```
//!
//! Set `RUST_LOG=debug` for diagnostic output on stderr.

mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use dst_engine::{iana, lookup_next_transition, lookup_season, Catalog, NoTransition, ZoneDatabase};

const DEMO_YEAR: i32 = 2017;
const DEMO_ZONE: &str = "Central Europe Standard Time";

#[derive(Parser)]
#[command(
    name = "dst",
    version,
    about = "Daylight-saving transition dates, next transitions and day lengths"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON zone catalog to use instead of the builtin one
    #[arg(long, global = true, env = "DST_CATALOG")]
    catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the zones in the catalog
    Zones,
    /// Show the DST start and end of a year
    Transitions {
        /// Year to resolve
        #[arg(short, long)]
        year: i32,
        /// Zone id or IANA name (all zones if omitted)
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Find the first transition on or after an instant
    Next {
        /// Zone id or IANA name
        #[arg(short, long)]
        timezone: String,
        /// Reference instant: YYYY-MM-DD, YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS
        #[arg(short, long)]
        asof: String,
    },
    /// Count the hours of a calendar day
    DayLength {
        /// Zone id or IANA name
        #[arg(short, long)]
        timezone: String,
        /// Date as YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },
    /// Compare a zone's rules with tzdata for one year
    Verify {
        /// Zone id or IANA name
        #[arg(short, long)]
        timezone: String,
        /// Year to check
        #[arg(short, long)]
        year: i32,
    },
    /// Run the 2017 walkthrough: every zone's transitions, then sample lookups
    Demo,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            // Re-parse with --help to show usage (clap handles this)
            Cli::parse_from(["dst", "--help"]);
            unreachable!();
        }
    };

    let catalog = load_catalog(cli.catalog.as_deref())?;

    match command {
        Commands::Zones => list_zones(&catalog, cli.json)?,
        Commands::Transitions { year, timezone } => {
            print_transitions(&catalog, year, timezone.as_deref(), cli.json)?
        }
        Commands::Next { timezone, asof } => {
            let as_of = parse_instant(&asof)?;
            print_next(&catalog, &timezone, as_of, cli.json)?;
        }
        Commands::DayLength { timezone, date } => {
            let date = parse_date(&date)?;
            print_day_length(&catalog, &timezone, date, cli.json)?;
        }
        Commands::Verify { timezone, year } => verify(&catalog, &timezone, year, cli.json)?,
        Commands::Demo => demo(&catalog)?,
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            log::debug!("loading catalog from {}", path.display());
            Catalog::from_path(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display()))
        }
        None => Catalog::builtin().context("Failed to load the builtin catalog"),
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by `T` or a space and
/// `HH:MM[:SS]`. A bare date means the start of that day.
fn parse_instant(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    parse_date(s)
        .map(|d| d.and_time(NaiveTime::MIN))
        .with_context(|| format!("Invalid instant '{}'", s))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", s))
}

fn require_zone<'a>(
    catalog: &'a Catalog,
    id: &str,
) -> Result<(&'a dst_engine::TimeZoneInfo, &'a dst_engine::RuleSet)> {
    match catalog.zone(id) {
        Some(zone) => Ok(zone),
        None => bail!(
            "Unknown time zone: '{}'. Run `dst zones` to list available zones.",
            id
        ),
    }
}

fn list_zones(catalog: &Catalog, json: bool) -> Result<()> {
    let zones = catalog.list_timezones();
    if json {
        println!("{}", serde_json::to_string_pretty(&zones)?);
        return Ok(());
    }
    for zone in zones {
        println!("{}: {}", zone.id, zone.display_name);
    }
    Ok(())
}

fn print_transitions(
    catalog: &Catalog,
    year: i32,
    timezone: Option<&str>,
    json: bool,
) -> Result<()> {
    let zones = match timezone {
        Some(id) => vec![require_zone(catalog, id)?.0.clone()],
        None => catalog.list_timezones(),
    };

    if json {
        let seasons: Vec<_> = zones
            .iter()
            .map(|info| (info, lookup_season(catalog, &info.id, year)))
            .collect();
        let dtos: Vec<render::SeasonDto> = seasons
            .iter()
            .map(|(info, season)| render::SeasonDto::new(info, year, season))
            .collect();
        println!("{}", serde_json::to_string_pretty(&dtos)?);
        return Ok(());
    }

    println!("Displaying transition dates info about {} year ...", year);
    println!("====================================================");
    for info in &zones {
        println!("{}:", info.standard_name);
        for line in render::season_lines(&lookup_season(catalog, &info.id, year)) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn print_next(catalog: &Catalog, timezone: &str, as_of: NaiveDateTime, json: bool) -> Result<()> {
    let (info, _) = require_zone(catalog, timezone)?;
    let next = match lookup_next_transition(catalog, &info.id, as_of) {
        Ok(t) => Some(t),
        Err(reason) => {
            log::info!("no transition for '{}' from {}: {}", info.id, as_of, reason);
            None
        }
    };

    if json {
        let dto = render::NextDto {
            timezone: &info.id,
            as_of,
            next,
        };
        println!("{}", serde_json::to_string_pretty(&dto)?);
    } else {
        println!("{}", render::next_line(as_of, next.as_ref()));
    }
    Ok(())
}

fn print_day_length(catalog: &Catalog, timezone: &str, date: NaiveDate, json: bool) -> Result<()> {
    let (info, rules) = require_zone(catalog, timezone)?;
    let hours = dst_engine::day_length_hours(date, rules);
    let minutes = dst_engine::day_length(date, rules).num_minutes();

    if json {
        let dto = render::DayLengthDto {
            timezone: &info.id,
            date,
            hours,
            minutes,
        };
        println!("{}", serde_json::to_string_pretty(&dto)?);
        return Ok(());
    }

    match dst_engine::transition_on(date, rules) {
        Some(t) => println!(
            "{} has {} hours ({}, {})",
            date,
            hours,
            render::direction_label(t.direction),
            render::hours_minutes(minutes)
        ),
        None => println!("{} has {} hours", date, hours),
    }
    Ok(())
}

fn verify(catalog: &Catalog, timezone: &str, year: i32, json: bool) -> Result<()> {
    let (info, rules) = require_zone(catalog, timezone)?;
    let Some(iana_name) = info.iana.as_deref() else {
        bail!("Time zone '{}' has no IANA mapping to verify against", info.id);
    };
    let tz = iana::parse_tz(iana_name)?;
    let mismatches = iana::compare_year(rules, tz, year);

    if json {
        println!("{}", serde_json::to_string_pretty(&mismatches)?);
    } else if mismatches.is_empty() {
        println!("{} agrees with {} in {}", info.id, iana_name, year);
    } else {
        println!("{} disagrees with {} in {}:", info.id, iana_name, year);
        for m in &mismatches {
            println!(
                "   {}: expected {}, observed {}",
                m.date,
                render::hours_minutes(m.expected_minutes),
                render::hours_minutes(m.observed_minutes)
            );
        }
    }

    if !mismatches.is_empty() {
        bail!("{} day(s) disagree with tzdata", mismatches.len());
    }
    Ok(())
}

fn demo(catalog: &Catalog) -> Result<()> {
    print_transitions(catalog, DEMO_YEAR, None, false)?;

    println!();
    println!("Next transition testing ...");
    println!("================================================");

    let dates = [
        NaiveDate::from_ymd_opt(DEMO_YEAR, 1, 1),
        NaiveDate::from_ymd_opt(DEMO_YEAR, 3, 27),
        NaiveDate::from_ymd_opt(DEMO_YEAR, 10, 29),
    ];
    for date in dates.into_iter().flatten() {
        let as_of = date.and_time(NaiveTime::MIN);
        let next = match lookup_next_transition(catalog, DEMO_ZONE, as_of) {
            Ok(t) => Some(t),
            Err(NoTransition::UnknownZone) => {
                bail!("The catalog has no '{}' zone", DEMO_ZONE)
            }
            Err(_) => None,
        };
        println!("{}", render::next_line(as_of, next.as_ref()));
    }
    Ok(())
}
