//! Transition resolution -- the next DST transition from an instant, and the
//! real length of a calendar day.
//!
//! All functions are pure over their inputs. Local date-times are compared in
//! full (date and time of day): a transition at 02:00 is still ahead of 00:30
//! on the same day and already behind 03:00.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::adjustment::{AdjustmentRule, RuleSet};
use crate::rule::TransitionRule;

/// Which way the clocks move at a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Start of daylight time; the day loses time.
    SpringForward,
    /// End of daylight time; the day gains time.
    FallBack,
}

/// A concrete transition instant in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub at: NaiveDateTime,
    pub direction: Direction,
    /// Size of the clock shift.
    pub delta_minutes: i64,
}

impl Transition {
    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }
}

/// Resolve a single transition rule in `year`. See [`TransitionRule::resolve`].
pub fn resolve_rule_date(rule: &TransitionRule, year: i32) -> Option<NaiveDateTime> {
    rule.resolve(year)
}

/// Pick the adjustment rule in force for `year`. See [`RuleSet::select_for_year`].
pub fn select_rule_for_year(rules: &RuleSet, year: i32) -> Option<&AdjustmentRule> {
    rules.select_for_year(year)
}

/// Earliest transition of `rule` resolved in `year` that is at or after `as_of`.
fn earliest_on_or_after(
    rule: &AdjustmentRule,
    year: i32,
    as_of: NaiveDateTime,
) -> Option<Transition> {
    let start = rule.start.resolve(year).map(|at| Transition {
        at,
        direction: Direction::SpringForward,
        delta_minutes: rule.daylight_delta_minutes,
    });
    let end = rule.end.resolve(year).map(|at| Transition {
        at,
        direction: Direction::FallBack,
        delta_minutes: rule.daylight_delta_minutes,
    });

    [start, end]
        .into_iter()
        .flatten()
        .filter(|t| t.at >= as_of)
        .min_by_key(|t| t.at)
}

/// Find the first transition at or after `as_of`.
///
/// The rule covering `as_of`'s year is resolved first. If both of its
/// transitions are already behind `as_of`, the search moves on to the rule
/// covering the following year and stops there.
///
/// Returns `None` when the zone has no rules, or no rule covers the year
/// (or the following year, when the search rolls over).
pub fn next_transition(as_of: NaiveDateTime, rules: &RuleSet) -> Option<Transition> {
    if rules.is_empty() {
        return None;
    }

    let year = as_of.year();
    let rule = rules.select_for_year(year)?;
    if let Some(found) = earliest_on_or_after(rule, year, as_of) {
        return Some(found);
    }

    let next_year = year.checked_add(1)?;
    let rule = rules.select_for_year(next_year)?;
    earliest_on_or_after(rule, next_year, as_of)
}

/// The transition falling on `date`, if any.
pub fn transition_on(date: NaiveDate, rules: &RuleSet) -> Option<Transition> {
    next_transition(date.and_time(NaiveTime::MIN), rules).filter(|t| t.date() == date)
}

/// Whole hours in `date`: 23 on a spring-forward day, 25 on a fall-back day,
/// 24 otherwise.
///
/// The direction comes from which transition (start or end of DST) fell on
/// the day, not from the month, so zones in either hemisphere classify
/// correctly.
pub fn day_length_hours(date: NaiveDate, rules: &RuleSet) -> u8 {
    match transition_on(date, rules).map(|t| t.direction) {
        Some(Direction::SpringForward) => 23,
        Some(Direction::FallBack) => 25,
        None => 24,
    }
}

/// Length of `date` honouring the rule's daylight delta (e.g. 30 minutes).
///
/// A delta too large to represent leaves the day at 24 hours.
pub fn day_length(date: NaiveDate, rules: &RuleSet) -> Duration {
    let day = Duration::hours(24);
    let Some(t) = transition_on(date, rules) else {
        return day;
    };
    let shifted = Duration::try_minutes(t.delta_minutes).and_then(|delta| match t.direction {
        Direction::SpringForward => day.checked_sub(&delta),
        Direction::FallBack => day.checked_add(&delta),
    });
    shifted.unwrap_or_else(|| {
        log::warn!(
            "daylight delta of {} minutes on {} is out of range",
            t.delta_minutes,
            date
        );
        day
    })
}

/// All transitions in the half-open window `[from, to)`, in order.
///
/// Years not covered by any rule are skipped rather than ending the walk.
pub fn transitions_between(
    rules: &RuleSet,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<Transition> {
    let mut found = Vec::new();
    if rules.is_empty() {
        return found;
    }

    let mut cursor = from;
    while cursor < to {
        match next_transition(cursor, rules) {
            Some(t) if t.at < to => {
                found.push(t);
                cursor = t.at + Duration::seconds(1);
            }
            Some(_) => break,
            None => {
                let Some(next_year) = cursor
                    .year()
                    .checked_add(1)
                    .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
                else {
                    break;
                };
                cursor = next_year.and_time(NaiveTime::MIN);
            }
        }
    }

    found
}
