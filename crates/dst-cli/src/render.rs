//! Console and JSON rendering of engine results.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use dst_engine::rule::{format_time, month_name, weekday_name};
use dst_engine::{Direction, NoTransition, Season, TimeZoneInfo, Transition, TransitionRule};
use serde::Serialize;

/// `March 22 at 00:00` for fixed rules, `Sunday, 2017-03-26 at 02:00` for floating ones.
pub fn describe(rule: &TransitionRule, at: NaiveDateTime) -> String {
    match *rule {
        TransitionRule::Fixed { month, day, time } => {
            format!("{} {} at {}", month_name(month), day, format_time(time))
        }
        TransitionRule::Floating { .. } => format!(
            "{}, {} at {}",
            weekday_name(at.weekday()),
            at.format("%Y-%m-%d"),
            format_time(at.time())
        ),
    }
}

/// The indented listing of one zone's season, as printed under its name.
pub fn season_lines(season: &std::result::Result<Season, NoTransition>) -> Vec<String> {
    match season {
        Err(NoTransition::NoRules) | Err(NoTransition::UnknownZone) => {
            vec!["   No adjustment rules.".to_string()]
        }
        Err(NoTransition::NoRuleForYear(_)) => {
            vec!["   No adjustment rules available for this year.".to_string()]
        }
        Ok(season) => {
            let mut lines = vec![format!(
                "   Begins on {}",
                describe(&season.start_rule, season.start)
            )];
            match (season.end_rule, season.end) {
                (Some(rule), Some(end)) => lines.push(format!("   Ends on {}", describe(&rule, end))),
                _ => lines.push(format!(
                    "   Ends on (no adjustment rule for {})",
                    season.end_year
                )),
            }
            lines
        }
    }
}

pub fn next_line(as_of: NaiveDateTime, next: Option<&Transition>) -> String {
    let result = next
        .map(|t| t.at.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!("Next transition date from {} is {}", as_of, result)
}

pub fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::SpringForward => "spring forward",
        Direction::FallBack => "fall back",
    }
}

/// `23h00m`
pub fn hours_minutes(minutes: i64) -> String {
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}

// ---------------------------------------------------------------------------
// JSON DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SeasonDto<'a> {
    pub id: &'a str,
    pub display_name: &'a str,
    pub year: i32,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// Why there is no season, when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<'a> SeasonDto<'a> {
    pub fn new(
        info: &'a TimeZoneInfo,
        year: i32,
        season: &std::result::Result<Season, NoTransition>,
    ) -> Self {
        let (start, end, reason) = match season {
            Ok(s) => (Some(s.start), s.end, None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        SeasonDto {
            id: &info.id,
            display_name: &info.display_name,
            year,
            start,
            end,
            reason,
        }
    }
}

#[derive(Serialize)]
pub struct NextDto<'a> {
    pub timezone: &'a str,
    pub as_of: NaiveDateTime,
    pub next: Option<Transition>,
}

#[derive(Serialize)]
pub struct DayLengthDto<'a> {
    pub timezone: &'a str,
    pub date: NaiveDate,
    pub hours: u8,
    pub minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn floating_rule_is_described_with_weekday_and_date() {
        let rule =
            TransitionRule::floating(3, 5, Weekday::Sun, NaiveTime::from_hms_opt(2, 0, 0).unwrap())
                .unwrap();
        assert_eq!(
            describe(&rule, at(2017, 3, 26, 2, 0)),
            "Sunday, 2017-03-26 at 02:00"
        );
    }

    #[test]
    fn fixed_rule_is_described_with_month_and_day() {
        let rule = TransitionRule::fixed(3, 22, NaiveTime::MIN).unwrap();
        assert_eq!(describe(&rule, at(2017, 3, 22, 0, 0)), "March 22 at 00:00");
    }

    #[test]
    fn missing_results_render_as_none() {
        assert_eq!(
            next_line(at(2017, 1, 1, 0, 0), None),
            "Next transition date from 2017-01-01 00:00:00 is none"
        );
    }

    #[test]
    fn durations_render_as_hours_and_minutes() {
        assert_eq!(hours_minutes(23 * 60), "23h00m");
        assert_eq!(hours_minutes(24 * 60 + 30), "24h30m");
    }
}
