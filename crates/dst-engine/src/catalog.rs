//! Zone database -- the read-only source of adjustment rules.
//!
//! The resolver never owns rule data. It reads it through [`ZoneDatabase`],
//! which hands out a snapshot of a zone's rules per call. [`Catalog`] is the
//! in-memory implementation, loaded from JSON; [`Catalog::builtin`] embeds a
//! small default catalog.
//!
//! ## Catalog format
//!
//! ```json
//! { "zones": [ {
//!     "id": "Central Europe Standard Time",
//!     "display_name": "(UTC+01:00) Belgrade, Bratislava, Budapest, Ljubljana, Prague",
//!     "standard_name": "Central Europe Standard Time",
//!     "iana": "Europe/Budapest",
//!     "rules": [
//!       { "date_start": "1996-01-01", "date_end": "9999-12-31",
//!         "posix": "CET-1CEST,M3.5.0,M10.5.0/3" }
//!     ] } ] }
//! ```
//!
//! A rule entry is either a POSIX TZ string with a validity range, as above, or
//! an explicit [`AdjustmentRule`] with `start`/`end` transition rules.

use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::adjustment::{AdjustmentRule, RuleSet, Season};
use crate::error::{DstError, Result};
use crate::posix::PosixTz;
use crate::resolver::{self, Transition};

const BUILTIN_CATALOG: &str = include_str!("../data/zones.json");

/// Identity of a timezone as listed by a zone database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeZoneInfo {
    pub id: String,
    pub display_name: String,
    pub standard_name: String,
    /// Matching IANA zone, used to cross-check rules against tzdata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iana: Option<String>,
}

/// Read-only source of timezones and their adjustment rules.
pub trait ZoneDatabase {
    fn list_timezones(&self) -> Vec<TimeZoneInfo>;

    /// Rules of the zone with the given id, or `None` if the zone is unknown.
    fn adjustment_rules(&self, zone_id: &str) -> Option<RuleSet>;
}

/// Why a zone lookup produced no transition. These are expected outcomes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoTransition {
    #[error("unknown time zone")]
    UnknownZone,

    #[error("no adjustment rules")]
    NoRules,

    #[error("no adjustment rules available for {0}")]
    NoRuleForYear(i32),
}

#[derive(Deserialize)]
struct PosixSource {
    date_start: NaiveDate,
    date_end: NaiveDate,
    posix: String,
}

enum RuleSource {
    Posix(PosixSource),
    Explicit(AdjustmentRule),
}

// Dispatch on the `posix` key so field errors of either shape surface as-is.
impl<'de> Deserialize<'de> for RuleSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let source = if value.get("posix").is_some() {
            serde_json::from_value(value).map(RuleSource::Posix)
        } else {
            serde_json::from_value(value).map(RuleSource::Explicit)
        };
        source.map_err(de::Error::custom)
    }
}

#[derive(Deserialize)]
struct ZoneRecord {
    #[serde(flatten)]
    info: TimeZoneInfo,
    #[serde(default)]
    rules: Vec<RuleSource>,
}

#[derive(Deserialize)]
struct CatalogFile {
    zones: Vec<ZoneRecord>,
}

#[derive(Debug, Clone)]
struct Zone {
    info: TimeZoneInfo,
    rules: RuleSet,
}

/// In-memory zone database.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    zones: Vec<Zone>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a JSON catalog.
    ///
    /// # Errors
    /// Returns `DstError::Catalog` for malformed JSON, `DstError::Posix` or
    /// `DstError::InvalidRule`/`InvalidAdjustment` for bad rules, and
    /// `DstError::InvalidTimezone` for duplicate ids or unknown IANA names.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Catalog::default();
        for record in file.zones {
            let rules = record
                .rules
                .into_iter()
                .filter_map(|source| build_rule(source).transpose())
                .collect::<Result<Vec<_>>>()?;
            catalog.insert(record.info, RuleSet::new(rules))?;
        }
        log::debug!("loaded catalog with {} zones", catalog.zones.len());
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a zone.
    ///
    /// # Errors
    /// Returns `DstError::InvalidTimezone` if the id is already present or the
    /// IANA name is unknown to chrono-tz, and rule validation errors otherwise.
    pub fn insert(&mut self, info: TimeZoneInfo, rules: RuleSet) -> Result<()> {
        if self.zones.iter().any(|z| z.info.id == info.id) {
            return Err(DstError::InvalidTimezone(format!(
                "duplicate zone id '{}'",
                info.id
            )));
        }
        if let Some(iana) = &info.iana {
            iana.parse::<chrono_tz::Tz>()
                .map_err(|_| DstError::InvalidTimezone(iana.clone()))?;
        }
        rules.validate()?;
        self.zones.push(Zone { info, rules });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Find a zone by id, falling back to its IANA name.
    pub fn zone(&self, id: &str) -> Option<(&TimeZoneInfo, &RuleSet)> {
        self.zones
            .iter()
            .find(|z| z.info.id == id)
            .or_else(|| {
                self.zones
                    .iter()
                    .find(|z| z.info.iana.as_deref() == Some(id))
            })
            .map(|z| (&z.info, &z.rules))
    }
}

fn build_rule(source: RuleSource) -> Result<Option<AdjustmentRule>> {
    match source {
        RuleSource::Posix(PosixSource {
            date_start,
            date_end,
            posix,
        }) => PosixTz::parse(&posix)?.adjustment_rule(date_start, date_end),
        RuleSource::Explicit(rule) => {
            rule.validate()?;
            Ok(Some(rule))
        }
    }
}

impl ZoneDatabase for Catalog {
    fn list_timezones(&self) -> Vec<TimeZoneInfo> {
        self.zones.iter().map(|z| z.info.clone()).collect()
    }

    fn adjustment_rules(&self, zone_id: &str) -> Option<RuleSet> {
        self.zone(zone_id).map(|(_, rules)| rules.clone())
    }
}

fn rules_for<D: ZoneDatabase + ?Sized>(
    db: &D,
    zone_id: &str,
) -> std::result::Result<RuleSet, NoTransition> {
    let rules = db.adjustment_rules(zone_id).ok_or_else(|| {
        log::debug!("zone '{}' not found", zone_id);
        NoTransition::UnknownZone
    })?;
    if rules.is_empty() {
        return Err(NoTransition::NoRules);
    }
    Ok(rules)
}

/// Next transition for a zone looked up by id, with the reason when there is none.
pub fn lookup_next_transition<D: ZoneDatabase + ?Sized>(
    db: &D,
    zone_id: &str,
    as_of: NaiveDateTime,
) -> std::result::Result<Transition, NoTransition> {
    let rules = rules_for(db, zone_id)?;
    resolver::next_transition(as_of, &rules).ok_or_else(|| {
        // A covered year with nothing left in it means the rollover missed.
        let year = as_of.year();
        match rules.select_for_year(year) {
            Some(_) => NoTransition::NoRuleForYear(year.saturating_add(1)),
            None => NoTransition::NoRuleForYear(year),
        }
    })
}

/// Next transition for a zone looked up by id. Unknown zones yield `None`.
pub fn next_transition_for_zone<D: ZoneDatabase + ?Sized>(
    db: &D,
    zone_id: &str,
    as_of: NaiveDateTime,
) -> Option<Transition> {
    lookup_next_transition(db, zone_id, as_of).ok()
}

/// Day length in hours for a zone looked up by id. Unknown zones yield `None`.
pub fn day_length_hours_for_zone<D: ZoneDatabase + ?Sized>(
    db: &D,
    zone_id: &str,
    date: NaiveDate,
) -> Option<u8> {
    let rules = db.adjustment_rules(zone_id)?;
    Some(resolver::day_length_hours(date, &rules))
}

/// The DST season starting in `year` for a zone looked up by id.
pub fn lookup_season<D: ZoneDatabase + ?Sized>(
    db: &D,
    zone_id: &str,
    year: i32,
) -> std::result::Result<Season, NoTransition> {
    let rules = rules_for(db, zone_id)?;
    rules.season(year).ok_or(NoTransition::NoRuleForYear(year))
}
