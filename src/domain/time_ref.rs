//! Time references naming a journal day

use crate::domain::DayBoundary;
use crate::error::{Result, SolaceError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::str::FromStr;

/// A day relative to "today", or a fixed calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeReference {
    Today,
    Yesterday,
    Tomorrow,
    /// Today if it matches, otherwise the most recent past occurrence
    Weekday(Weekday),
    /// Strictly before today
    LastWeekday(Weekday),
    /// Strictly after today
    NextWeekday(Weekday),
    SpecificDate(NaiveDate),
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

impl TimeReference {
    /// Parse a time reference string.
    ///
    /// Accepts `today`/`now`, `yesterday`, `tomorrow`, weekday names with an
    /// optional `last `/`next ` prefix, `DD-MM-YYYY` and `YYYY-MM-DD`.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        let invalid = || SolaceError::InvalidTimeReference(input.to_string());

        match normalized.as_str() {
            "today" | "now" => return Ok(TimeReference::Today),
            "yesterday" => return Ok(TimeReference::Yesterday),
            "tomorrow" => return Ok(TimeReference::Tomorrow),
            _ => {}
        }

        if let Some(rest) = normalized.strip_prefix("last ") {
            return parse_weekday(rest.trim())
                .map(TimeReference::LastWeekday)
                .ok_or_else(invalid);
        }
        if let Some(rest) = normalized.strip_prefix("next ") {
            return parse_weekday(rest.trim())
                .map(TimeReference::NextWeekday)
                .ok_or_else(invalid);
        }
        if let Some(day) = parse_weekday(&normalized) {
            return Ok(TimeReference::Weekday(day));
        }

        NaiveDate::parse_from_str(&normalized, "%d-%m-%Y")
            .or_else(|_| NaiveDate::parse_from_str(&normalized, "%Y-%m-%d"))
            .map(TimeReference::SpecificDate)
            .map_err(|_| invalid())
    }

    /// Resolve against an explicit "today"
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        let days_since = |target: Weekday| {
            i64::from(
                (today.weekday().num_days_from_monday() + 7 - target.num_days_from_monday()) % 7,
            )
        };

        match *self {
            TimeReference::Today => today,
            TimeReference::Yesterday => today - Duration::days(1),
            TimeReference::Tomorrow => today + Duration::days(1),
            TimeReference::Weekday(day) => today - Duration::days(days_since(day)),
            TimeReference::LastWeekday(day) => {
                let back = match days_since(day) {
                    0 => 7,
                    n => n,
                };
                today - Duration::days(back)
            }
            TimeReference::NextWeekday(day) => {
                let forward = match (7 - days_since(day)) % 7 {
                    0 => 7,
                    n => n,
                };
                today + Duration::days(forward)
            }
            TimeReference::SpecificDate(date) => date,
        }
    }

    /// Resolve against today's date under a day boundary
    pub fn resolve_in(&self, boundary: &DayBoundary) -> NaiveDate {
        self.resolve(boundary.today())
    }
}

impl FromStr for TimeReference {
    type Err = SolaceError;

    fn from_str(s: &str) -> Result<Self> {
        TimeReference::parse(s)
    }
}
