//! Calendar day boundary used to decide which day an entry belongs to

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where one journal day ends and the next begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayBoundary {
    /// Midnight UTC
    #[default]
    Utc,
    /// Midnight in the server's local time zone
    Local,
    /// Midnight at a fixed UTC offset
    Offset(FixedOffset),
}

impl DayBoundary {
    /// Calendar date of an instant under this boundary
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Utc => instant.date_naive(),
            DayBoundary::Local => instant.with_timezone(&Local).date_naive(),
            DayBoundary::Offset(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Today's calendar date under this boundary
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl FromStr for DayBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "utc" | "z" => Ok(DayBoundary::Utc),
            "local" => Ok(DayBoundary::Local),
            other => parse_offset(other).map(DayBoundary::Offset).ok_or_else(|| {
                format!(
                    "Invalid day boundary: '{}'. Valid values are: utc, local, or an offset like +02:00",
                    s
                )
            }),
        }
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBoundary::Utc => f.write_str("utc"),
            DayBoundary::Local => f.write_str("local"),
            DayBoundary::Offset(offset) => write!(f, "{}", offset),
        }
    }
}

impl TryFrom<String> for DayBoundary {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayBoundary> for String {
    fn from(value: DayBoundary) -> Self {
        value.to_string()
    }
}
