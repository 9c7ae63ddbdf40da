//! # dst-engine
//!
//! Deterministic daylight-saving transition resolution.
//!
//! Given a timezone's adjustment rules (supplied by a [`ZoneDatabase`]), the
//! engine answers three questions: when the transitions of a year fall, what
//! the next transition on or after an instant is, and how many hours a
//! calendar day really has (23, 24 or 25).
//!
//! ```rust
//! use chrono::NaiveDate;
//! use dst_engine::{day_length_hours, next_transition, Catalog, ZoneDatabase};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let rules = catalog.adjustment_rules("Central Europe Standard Time").unwrap();
//!
//! let as_of = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let next = next_transition(as_of, &rules).unwrap();
//! assert_eq!(next.at.to_string(), "2017-03-26 02:00:00");
//!
//! let spring = NaiveDate::from_ymd_opt(2017, 3, 26).unwrap();
//! assert_eq!(day_length_hours(spring, &rules), 23);
//! ```
//!
//! ## Modules
//!
//! - [`rule`] — Fixed and floating transition rules, resolved per year
//! - [`adjustment`] — Adjustment rules, rule sets, DST seasons
//! - [`resolver`] — Next transition and day length
//! - [`posix`] — POSIX TZ strings → adjustment rules
//! - [`catalog`] — Zone database trait and the JSON catalog
//! - [`iana`] — Cross-check against tzdata via `chrono-tz`
//! - [`error`] — Error types

pub mod adjustment;
pub mod catalog;
pub mod error;
pub mod iana;
pub mod posix;
pub mod resolver;
pub mod rule;

pub use adjustment::{AdjustmentRule, RuleSet, Season};
pub use catalog::{
    day_length_hours_for_zone, lookup_next_transition, lookup_season, next_transition_for_zone,
    Catalog, NoTransition, TimeZoneInfo, ZoneDatabase,
};
pub use error::DstError;
pub use posix::PosixTz;
pub use resolver::{
    day_length, day_length_hours, next_transition, resolve_rule_date, select_rule_for_year,
    transition_on, transitions_between, Direction, Transition,
};
pub use rule::TransitionRule;
