//! POSIX TZ strings -- the compact rule form used by `TZ` and TZif footers.
//!
//! Supported grammar: `std offset [dst [offset] ,start[/time],end[/time]]`
//! where `start`/`end` are `Mm.w.d` (floating) or `Jn` (fixed, Feb 29 never
//! counted). Zero-based `n` day-of-year rules and transition times outside
//! `[00:00, 24:00)` have no equivalent adjustment rule and are rejected.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

use crate::adjustment::AdjustmentRule;
use crate::error::{DstError, Result};
use crate::rule::TransitionRule;

/// Parsed POSIX TZ string. Offsets are seconds east of UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosixTz {
    pub std_name: String,
    pub std_offset_seconds: i32,
    pub dst: Option<PosixDst>,
}

/// Daylight part of a POSIX TZ string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosixDst {
    pub name: String,
    pub offset_seconds: i32,
    pub start: TransitionRule,
    pub end: TransitionRule,
}

impl PosixTz {
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).tz()
    }

    /// Clock shift between standard and daylight time, in minutes.
    pub fn delta_minutes(&self) -> Option<i64> {
        self.dst
            .as_ref()
            .map(|dst| i64::from(dst.offset_seconds - self.std_offset_seconds) / 60)
    }

    /// The adjustment rule this string describes over the given validity range.
    ///
    /// `Ok(None)` when the string has no daylight part.
    pub fn adjustment_rule(
        &self,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<Option<AdjustmentRule>> {
        let (Some(dst), Some(delta)) = (&self.dst, self.delta_minutes()) else {
            return Ok(None);
        };
        let rule = AdjustmentRule::new(date_start, date_end, dst.start, dst.end)?
            .with_delta_minutes(delta);
        rule.validate()?;
        Ok(Some(rule))
    }
}

impl FromStr for PosixTz {
    type Err = DstError;

    fn from_str(s: &str) -> Result<Self> {
        PosixTz::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> DstError {
        DstError::Posix {
            input: self.input.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected '{}' at position {}",
                byte as char, self.pos
            )))
        }
    }

    fn tz(mut self) -> Result<PosixTz> {
        let std_name = self.name()?;
        // POSIX offsets count hours west of UTC.
        let std_offset_seconds = -self.offset()?;

        if self.is_done() {
            return Ok(PosixTz {
                std_name,
                std_offset_seconds,
                dst: None,
            });
        }

        let dst_name = self.name()?;
        let dst_offset_seconds = match self.peek() {
            Some(b',') => std_offset_seconds + 3600,
            Some(_) => -self.offset()?,
            None => return Err(self.error("daylight start and end rules must be provided")),
        };

        self.expect(b',')?;
        let start = self.rule()?;
        self.expect(b',')?;
        let end = self.rule()?;

        if !self.is_done() {
            return Err(self.error("trailing data after end rule"));
        }

        Ok(PosixTz {
            std_name,
            std_offset_seconds,
            dst: Some(PosixDst {
                name: dst_name,
                offset_seconds: dst_offset_seconds,
                start,
                end,
            }),
        })
    }

    fn name(&mut self) -> Result<String> {
        let input = self.input;
        let begin = self.pos;
        let name = if self.eat(b'<') {
            let inner = self.pos;
            while self.peek().is_some_and(|b| b != b'>') {
                self.pos += 1;
            }
            let name = &input[inner..self.pos];
            self.expect(b'>')?;
            name
        } else {
            while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
                self.pos += 1;
            }
            &input[begin..self.pos]
        };
        if name.len() < 3 {
            return Err(self.error(format!(
                "zone abbreviation at position {} must have at least 3 characters",
                begin
            )));
        }
        Ok(name.to_string())
    }

    fn number(&mut self) -> Result<u32> {
        let begin = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input[begin..self.pos]
            .parse()
            .map_err(|_| self.error(format!("expected a number at position {}", begin)))
    }

    /// `[+-]hh[:mm[:ss]]` as signed seconds.
    fn signed_hms(&mut self) -> Result<i32> {
        let sign = if self.eat(b'-') {
            -1
        } else {
            self.eat(b'+');
            1
        };
        let hours = self.number()?;
        let mut minutes = 0;
        let mut seconds = 0;
        if self.eat(b':') {
            minutes = self.number()?;
            if self.eat(b':') {
                seconds = self.number()?;
            }
        }
        if hours > 167 || minutes > 59 || seconds > 59 {
            return Err(self.error("time component out of range"));
        }
        let total = hours * 3600 + minutes * 60 + seconds;
        Ok(sign * total as i32)
    }

    fn offset(&mut self) -> Result<i32> {
        let seconds = self.signed_hms()?;
        if seconds.abs() > 24 * 3600 {
            return Err(self.error("UTC offset exceeds 24 hours"));
        }
        Ok(seconds)
    }

    fn rule(&mut self) -> Result<TransitionRule> {
        let rule = match self.peek() {
            Some(b'M') => {
                self.pos += 1;
                let month = self.number()?;
                self.expect(b'.')?;
                let week = self.number()?;
                self.expect(b'.')?;
                let day = self.number()?;
                let weekday = weekday_from_sunday(day)
                    .ok_or_else(|| self.error(format!("weekday {} is outside 0..=6", day)))?;
                let week = u8::try_from(week)
                    .map_err(|_| self.error(format!("week {} is outside 1..=5", week)))?;
                let time = self.rule_time()?;
                TransitionRule::floating(month, week, weekday, time)
            }
            Some(b'J') => {
                self.pos += 1;
                let julian = self.number()?;
                if !(1..=365).contains(&julian) {
                    return Err(self.error(format!("julian day {} is outside 1..=365", julian)));
                }
                // 2017 is a common year, so Jn maps straight onto month/day.
                let date = NaiveDate::from_yo_opt(2017, julian)
                    .ok_or_else(|| self.error("julian day out of range"))?;
                let time = self.rule_time()?;
                TransitionRule::fixed(date.month(), date.day(), time)
            }
            Some(b) if b.is_ascii_digit() => {
                return Err(self.error("zero-based day-of-year rules are not supported"));
            }
            _ => return Err(self.error(format!("expected a rule at position {}", self.pos))),
        };
        rule.map_err(|e| self.error(e.to_string()))
    }

    fn rule_time(&mut self) -> Result<NaiveTime> {
        if !self.eat(b'/') {
            return Ok(NaiveTime::from_hms_opt(2, 0, 0).unwrap_or(NaiveTime::MIN));
        }
        let seconds = self.signed_hms()?;
        if !(0..24 * 3600).contains(&seconds) {
            return Err(self.error("transition times outside 00:00..24:00 are not supported"));
        }
        NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
            .ok_or_else(|| self.error("invalid transition time"))
    }
}

fn weekday_from_sunday(day: u32) -> Option<Weekday> {
    Some(match day {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => return None,
    })
}
