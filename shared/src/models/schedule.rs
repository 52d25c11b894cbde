//! Opening hours and closing days
//!
//! Both are stored and exchanged as the human-written strings restaurants
//! enter (`"11:30-14:00, 17:00-22:00"`, `"日曜日・月曜日"`), and parsed into
//! structured values on the way in. Serialization writes the canonical form
//! back out, so a parsed value always re-parses to itself.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Schedule parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleParseError {
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("invalid opening window '{0}', expected HH:MM-HH:MM")]
    InvalidWindow(String),
    #[error("unknown closing day '{0}'")]
    UnknownClosingDay(String),
}

/// Parse `HH:MM` into minutes since midnight. `24:00` is accepted as end of day.
fn parse_minutes(raw: &str) -> Result<u16, ScheduleParseError> {
    let raw = raw.trim();
    let invalid = || ScheduleParseError::InvalidTime(raw.to_string());
    let (h, m) = raw.split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let h: u16 = h.parse().map_err(|_| invalid())?;
    let m: u16 = m.parse().map_err(|_| invalid())?;
    match (h, m) {
        (24, 0) => Ok(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Ok(h * 60 + m),
        _ => Err(invalid()),
    }
}

fn format_minutes(minutes: u16, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", minutes / 60, minutes % 60)
}

/// One service window, `open` inclusive and `close` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningWindow {
    open: u16,
    close: u16,
}

impl OpeningWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open: (open.hour() * 60 + open.minute()) as u16,
            close: (close.hour() * 60 + close.minute()) as u16,
        }
    }

    /// Windows whose close is not after the open run past midnight
    pub fn wraps_midnight(&self) -> bool {
        self.close <= self.open
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        let t = (time.hour() * 60 + time.minute()) as u16;
        if self.wraps_midnight() {
            t >= self.open || t < self.close % MINUTES_PER_DAY
        } else {
            self.open <= t && t < self.close
        }
    }
}

impl FromStr for OpeningWindow {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (open, close) = s
            .split_once(['-', '~', '〜'])
            .ok_or_else(|| ScheduleParseError::InvalidWindow(s.to_string()))?;
        let open = parse_minutes(open)?;
        let close = parse_minutes(close)?;
        if open == MINUTES_PER_DAY {
            return Err(ScheduleParseError::InvalidWindow(s.to_string()));
        }
        Ok(Self { open, close })
    }
}

impl fmt::Display for OpeningWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_minutes(self.open, f)?;
        f.write_str("-")?;
        format_minutes(self.close, f)
    }
}

/// Declared opening hours of a restaurant
///
/// An empty list means no hours were declared; such a restaurant never
/// rejects a request for being outside its hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpeningHours(Vec<OpeningWindow>);

impl OpeningHours {
    pub fn new(windows: Vec<OpeningWindow>) -> Self {
        Self(windows)
    }

    pub fn windows(&self) -> &[OpeningWindow] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.0.is_empty() || self.0.iter().any(|w| w.contains(time))
    }
}

impl FromStr for OpeningHours {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split([',', '、', '/'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(OpeningWindow::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, window) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{window}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for OpeningHours {
    type Error = ScheduleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OpeningHours> for String {
    fn from(value: OpeningHours) -> Self {
        value.to_string()
    }
}

/// A single closing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingDay {
    /// Closed every week on this day
    Weekday(Weekday),
    /// Closed on this specific date
    Date(NaiveDate),
}

impl ClosingDay {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Weekday(day) => date.weekday() == *day,
            Self::Date(d) => *d == date,
        }
    }
}

fn parse_japanese_weekday(s: &str) -> Option<Weekday> {
    let head = s.strip_suffix("曜日").or_else(|| s.strip_suffix('曜')).unwrap_or(s);
    match head {
        "月" => Some(Weekday::Mon),
        "火" => Some(Weekday::Tue),
        "水" => Some(Weekday::Wed),
        "木" => Some(Weekday::Thu),
        "金" => Some(Weekday::Fri),
        "土" => Some(Weekday::Sat),
        "日" => Some(Weekday::Sun),
        _ => None,
    }
}

impl FromStr for ClosingDay {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::Date(date));
        }
        if let Some(day) = parse_japanese_weekday(s) {
            return Ok(Self::Weekday(day));
        }
        // chrono accepts "Mon" / "Monday", case-insensitive
        s.parse::<Weekday>()
            .map(Self::Weekday)
            .map_err(|_| ScheduleParseError::UnknownClosingDay(s.to_string()))
    }
}

impl fmt::Display for ClosingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekday(day) => {
                let name = match day {
                    Weekday::Mon => "Monday",
                    Weekday::Tue => "Tuesday",
                    Weekday::Wed => "Wednesday",
                    Weekday::Thu => "Thursday",
                    Weekday::Fri => "Friday",
                    Weekday::Sat => "Saturday",
                    Weekday::Sun => "Sunday",
                };
                f.write_str(name)
            }
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Declared closing days of a restaurant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClosingDays(Vec<ClosingDay>);

impl ClosingDays {
    pub fn new(days: Vec<ClosingDay>) -> Self {
        Self(days)
    }

    pub fn days(&self) -> &[ClosingDay] {
        &self.0
    }

    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.0.iter().any(|d| d.matches(date))
    }
}

impl FromStr for ClosingDays {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if matches!(trimmed, "" | "なし" | "無休" | "年中無休" | "None" | "none") {
            return Ok(Self::default());
        }
        trimmed
            .split([',', '、', '・', '/'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ClosingDay::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for ClosingDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, day) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{day}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ClosingDays {
    type Error = ScheduleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClosingDays> for String {
    fn from(value: ClosingDays) -> Self {
        value.to_string()
    }
}
