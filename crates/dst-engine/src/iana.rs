//! Cross-check adjustment rules against the IANA tz database (via chrono-tz).
//!
//! Day lengths are measured, not derived: the first existing local instant of
//! a day is located in the real zone, and the distance to the first instant of
//! the next day is the length of the day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::adjustment::RuleSet;
use crate::error::{DstError, Result};
use crate::resolver;

/// A day whose computed length disagrees with tzdata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub date: NaiveDate,
    pub expected_minutes: i64,
    pub observed_minutes: i64,
}

pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| DstError::InvalidTimezone(name.to_string()))
}

/// First instant of `date` in `tz`. Midnight may fall inside a gap, in which
/// case the wall clock is stepped forward until it exists.
fn first_instant(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=8)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Real length of the local calendar day `date` in `tz`.
pub fn observed_day_length(tz: Tz, date: NaiveDate) -> Option<Duration> {
    let start = first_instant(tz, date)?;
    let end = first_instant(tz, date.succ_opt()?)?;
    Some(end - start)
}

/// Every day of `year` where [`resolver::day_length`] disagrees with tzdata.
pub fn compare_year(rules: &RuleSet, tz: Tz, year: i32) -> Vec<Mismatch> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.year() == year)
        .filter_map(|date| {
            let observed = observed_day_length(tz, date)?;
            let expected = resolver::day_length(date, rules);
            (observed != expected).then(|| Mismatch {
                date,
                expected_minutes: expected.num_minutes(),
                observed_minutes: observed.num_minutes(),
            })
        })
        .collect()
}
