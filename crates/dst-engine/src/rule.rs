//! Transition rules -- one side (start or end) of a daylight-saving adjustment.
//!
//! A rule is either pinned to a calendar date (`Fixed`) or floats with the
//! weekday layout of the year (`Floating`, e.g. "last Sunday of March").
//! [`TransitionRule::resolve`] turns a rule into a concrete local date-time.

use std::fmt;

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DstError, Result};

/// Longest length of each month across leap and common years.
const MAX_DAYS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// One side of a DST adjustment, as published by a timezone database.
///
/// `time` is local wall-clock time at which the transition happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionRule {
    /// The same month and day every year.
    Fixed {
        month: u32,
        day: u32,
        time: NaiveTime,
    },
    /// The `week`-th `weekday` of `month`. Week 5 means the last occurrence.
    Floating {
        month: u32,
        week: u8,
        weekday: Weekday,
        time: NaiveTime,
    },
}

impl TransitionRule {
    /// Build a fixed-date rule.
    ///
    /// # Errors
    /// Returns `DstError::InvalidRule` if `month` is outside 1..=12 or `day` can
    /// never occur in that month.
    pub fn fixed(month: u32, day: u32, time: NaiveTime) -> Result<Self> {
        let rule = TransitionRule::Fixed { month, day, time };
        rule.validate()?;
        Ok(rule)
    }

    /// Build a floating rule such as "second Sunday of March".
    ///
    /// # Errors
    /// Returns `DstError::InvalidRule` if `month` is outside 1..=12 or `week`
    /// is outside 1..=5.
    pub fn floating(month: u32, week: u8, weekday: Weekday, time: NaiveTime) -> Result<Self> {
        let rule = TransitionRule::Floating {
            month,
            week,
            weekday,
            time,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check the field ranges of a rule built directly or deserialized.
    pub fn validate(&self) -> Result<()> {
        let month = self.month();
        if !(1..=12).contains(&month) {
            return Err(DstError::InvalidRule(format!(
                "month {} is outside 1..=12",
                month
            )));
        }
        match *self {
            TransitionRule::Fixed { day, .. } => {
                let max = MAX_DAYS[(month - 1) as usize];
                if day == 0 || day > max {
                    return Err(DstError::InvalidRule(format!(
                        "day {} does not exist in month {}",
                        day, month
                    )));
                }
            }
            TransitionRule::Floating { week, .. } => {
                if !(1..=5).contains(&week) {
                    return Err(DstError::InvalidRule(format!(
                        "week {} is outside 1..=5",
                        week
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn month(&self) -> u32 {
        match *self {
            TransitionRule::Fixed { month, .. } | TransitionRule::Floating { month, .. } => month,
        }
    }

    pub fn time(&self) -> NaiveTime {
        match *self {
            TransitionRule::Fixed { time, .. } | TransitionRule::Floating { time, .. } => time,
        }
    }

    pub fn is_fixed_date(&self) -> bool {
        matches!(self, TransitionRule::Fixed { .. })
    }

    /// Resolve the rule to a local date-time in `year`.
    ///
    /// Floating rules locate the `week`-th occurrence of `weekday`, starting the
    /// search window at day `week * 7 - 6` (1, 8, 15, 22 or 29). When a 5th
    /// occurrence does not exist the 4th is used instead. A fixed day past the
    /// end of a short month (Feb 29 in a common year) is clamped to the month's
    /// last day.
    ///
    /// The time of day is always carried over, so results can be ordered
    /// against arbitrary instants.
    ///
    /// Returns `None` for a malformed rule or a year outside chrono's range.
    pub fn resolve(&self, year: i32) -> Option<NaiveDateTime> {
        let date = match *self {
            TransitionRule::Fixed { month, day, .. } => {
                if day == 0 {
                    return None;
                }
                let last = days_in_month(year, month)?;
                NaiveDate::from_ymd_opt(year, month, day.min(last))?
            }
            TransitionRule::Floating {
                month,
                week,
                weekday,
                ..
            } => {
                if !(1..=5).contains(&week) {
                    return None;
                }
                let first = NaiveDate::from_ymd_opt(year, month, 1)?;
                let window_start = u32::from(week) * 7 - 6;
                let first_weekday = first.weekday().num_days_from_sunday();
                let target = weekday.num_days_from_sunday();

                let mut day = if first_weekday <= target {
                    window_start + (target - first_weekday)
                } else {
                    window_start + (7 - first_weekday + target)
                };
                if day > days_in_month(year, month)? {
                    day -= 7;
                }
                NaiveDate::from_ymd_opt(year, month, day)?
            }
        };
        log::trace!("resolved {} in {} to {}", self, year, date);
        Some(date.and_time(self.time()))
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TransitionRule::Fixed { month, day, time } => write!(
                f,
                "{} {} at {}",
                month_name(month),
                day,
                format_time(time)
            ),
            TransitionRule::Floating {
                month,
                week,
                weekday,
                time,
            } => {
                let ordinal = match week {
                    1 => "first",
                    2 => "second",
                    3 => "third",
                    4 => "fourth",
                    _ => "last",
                };
                write!(
                    f,
                    "{} {} of {} at {}",
                    ordinal,
                    weekday_name(weekday),
                    month_name(month),
                    format_time(time)
                )
            }
        }
    }
}

/// Number of days in `month` of `year`, or `None` outside chrono's range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

/// English month name, e.g. "March".
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("?")
}

/// English weekday name, e.g. "Sunday".
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `HH:MM`, or `HH:MM:SS` when the time has a seconds component.
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}
