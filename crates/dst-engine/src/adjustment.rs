//! Adjustment rules and rule sets.
//!
//! A timezone publishes an ordered list of adjustment rules, each valid over an
//! inclusive range of years and carrying the start and end transition of DST.
//! The list is non-overlapping by construction of the source database; this
//! module trusts that and simply takes the first rule that covers a year.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DstError, Result};
use crate::rule::TransitionRule;

fn default_delta() -> i64 {
    60
}

/// A pair of transitions in force over `[date_start.year, date_end.year]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    /// Transition into daylight time.
    pub start: TransitionRule,
    /// Transition back to standard time.
    pub end: TransitionRule,
    /// Clock shift applied while daylight time is in effect.
    #[serde(default = "default_delta")]
    pub daylight_delta_minutes: i64,
}

impl AdjustmentRule {
    /// Build a rule with the usual one-hour daylight delta.
    ///
    /// # Errors
    /// Returns `DstError::InvalidAdjustment` if `date_end` precedes `date_start`,
    /// or `DstError::InvalidRule` if either transition is malformed.
    pub fn new(
        date_start: NaiveDate,
        date_end: NaiveDate,
        start: TransitionRule,
        end: TransitionRule,
    ) -> Result<Self> {
        let rule = AdjustmentRule {
            date_start,
            date_end,
            start,
            end,
            daylight_delta_minutes: default_delta(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_delta_minutes(mut self, minutes: i64) -> Self {
        self.daylight_delta_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_end < self.date_start {
            return Err(DstError::InvalidAdjustment(format!(
                "date_end {} precedes date_start {}",
                self.date_end, self.date_start
            )));
        }
        if self.daylight_delta_minutes <= 0 || self.daylight_delta_minutes >= 24 * 60 {
            return Err(DstError::InvalidAdjustment(format!(
                "daylight delta of {} minutes is out of range",
                self.daylight_delta_minutes
            )));
        }
        self.start.validate()?;
        self.end.validate()
    }

    /// Whether this rule is in force for `year` (inclusive on both ends).
    pub fn covers(&self, year: i32) -> bool {
        self.date_start.year() <= year && year <= self.date_end.year()
    }

    /// Whether daylight time runs across the new year (southern hemisphere).
    pub fn crosses_year(&self) -> bool {
        self.end.month() < self.start.month()
    }
}

/// The ordered adjustment rules of one timezone. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<AdjustmentRule>);

/// The DST period that begins in a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Season {
    /// Year the season belongs to (the year its start transition falls in).
    pub year: i32,
    pub start: NaiveDateTime,
    pub start_rule: TransitionRule,
    /// `None` when the end falls in the following year and no rule covers it.
    pub end: Option<NaiveDateTime>,
    pub end_rule: Option<TransitionRule>,
    /// Year the end transition was resolved in.
    pub end_year: i32,
}

impl RuleSet {
    pub fn new(rules: Vec<AdjustmentRule>) -> Self {
        RuleSet(rules)
    }

    pub fn empty() -> Self {
        RuleSet(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AdjustmentRule> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[AdjustmentRule] {
        &self.0
    }

    pub fn validate(&self) -> Result<()> {
        self.0.iter().try_for_each(AdjustmentRule::validate)
    }

    /// First rule, in sequence order, that covers `year`.
    ///
    /// `None` is a normal outcome: the zone has no rules at all, or its rule
    /// window does not reach `year`.
    pub fn select_for_year(&self, year: i32) -> Option<&AdjustmentRule> {
        let found = self.0.iter().find(|rule| rule.covers(year));
        if found.is_none() && !self.0.is_empty() {
            log::debug!("no adjustment rule covers {}", year);
        }
        found
    }

    /// Resolve the DST season that starts in `year`.
    ///
    /// When the end transition's month precedes the start's, the season ends in
    /// the following year and the end is taken from the rule covering
    /// `year + 1`, resolved in that year.
    pub fn season(&self, year: i32) -> Option<Season> {
        let rule = self.select_for_year(year)?;
        let start = rule.start.resolve(year)?;

        let (end_rule, end_year) = if rule.crosses_year() {
            let next_year = year.checked_add(1)?;
            (self.select_for_year(next_year).map(|r| r.end), next_year)
        } else {
            (Some(rule.end), year)
        };
        let end = end_rule.and_then(|r| r.resolve(end_year));

        Some(Season {
            year,
            start,
            start_rule: rule.start,
            end,
            end_rule: end.and(end_rule),
            end_year,
        })
    }
}

impl From<Vec<AdjustmentRule>> for RuleSet {
    fn from(rules: Vec<AdjustmentRule>) -> Self {
        RuleSet(rules)
    }
}

impl FromIterator<AdjustmentRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = AdjustmentRule>>(iter: I) -> Self {
        RuleSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a AdjustmentRule;
    type IntoIter = std::slice::Iter<'a, AdjustmentRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
