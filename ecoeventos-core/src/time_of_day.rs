//! Time of day for `hora_inicio` / `hora_fin`.
//!
//! Events arrive with either 24-hour (`HH:MM`) or 12-hour (`hh:mm AM/PM`)
//! text. Both parse into a [`TimeOfDay`]; the persisted form is always 24-hour.
//! Records written by older versions may hold `null` or blank text instead,
//! which [`StoredTime`] keeps as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Parse `HH:MM` (hour 0-23, one or two digits; minute always two digits).
    pub fn parse_24h(s: &str) -> Option<Self> {
        let (hour, minute) = split_clock(s.trim())?;
        Self::new(hour, minute)
    }

    /// Parse `hh:mm AM` / `hh:mm PM` (hour 1-12, meridiem case-insensitive,
    /// space before it optional).
    pub fn parse_12h(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
            return None;
        }
        let (clock, meridiem) = s.split_at(s.len() - 2);
        let pm = match meridiem.to_ascii_uppercase().as_str() {
            "AM" => false,
            "PM" => true,
            _ => return None,
        };

        let (hour, minute) = split_clock(clock.trim_end())?;
        if !(1..=12).contains(&hour) {
            return None;
        }

        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        Self::new(hour, minute)
    }

    /// Parse either representation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::parse_24h(s).or_else(|| Self::parse_12h(s))
    }

    pub fn to_24h_string(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    pub fn to_12h_string(&self) -> String {
        let (hour, meridiem) = match self.hour {
            0 => (12, "AM"),
            12 => (12, "PM"),
            h if h > 12 => (h - 12, "PM"),
            h => (h, "AM"),
        };
        format!("{:02}:{:02} {}", hour, self.minute, meridiem)
    }
}

/// Split `H:MM` / `HH:MM` into numbers. Both parts must be plain digits.
fn split_clock(s: &str) -> Option<(u8, u8)> {
    let (hour, minute) = s.split_once(':')?;
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return None;
    }

    Some((hour.parse().ok()?, minute.parse().ok()?))
}

/// A persisted `hora_inicio` / `hora_fin`.
///
/// Values that are not a time of day (`null`, `""`, free text) load as
/// `Unparsed` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredTime {
    Time(TimeOfDay),
    Unparsed(Option<String>),
}

impl StoredTime {
    pub fn time(&self) -> Option<TimeOfDay> {
        match self {
            StoredTime::Time(t) => Some(*t),
            StoredTime::Unparsed(_) => None,
        }
    }
}

impl Default for StoredTime {
    fn default() -> Self {
        StoredTime::Unparsed(None)
    }
}

impl From<TimeOfDay> for StoredTime {
    fn from(t: TimeOfDay) -> Self {
        StoredTime::Time(t)
    }
}

impl fmt::Display for StoredTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoredTime::Time(t) => fmt::Display::fmt(t, f),
            StoredTime::Unparsed(raw) => f.write_str(raw.as_deref().unwrap_or_default()),
        }
    }
}

/// Convert 12-hour text to 24-hour text. Anything that is not valid 12-hour
/// text is returned unchanged.
///
/// Output is always zero-padded `HH:MM`, so only canonical `hh:mm AM` input
/// survives a `to_12h(&to_24h(s))` round trip unchanged; `"9:05 pm"` comes
/// back as `"09:05 PM"`.
pub fn to_24h(s: &str) -> String {
    match TimeOfDay::parse_12h(s) {
        Some(t) => t.to_24h_string(),
        None => s.to_string(),
    }
}

/// Convert 24-hour text to 12-hour text. Anything that is not valid 24-hour
/// text is returned unchanged.
///
/// Output is always `hh:mm AM` / `hh:mm PM`; zero-padded `HH:MM` input
/// round-trips through [`to_24h`] unchanged.
pub fn to_12h(s: &str) -> String {
    match TimeOfDay::parse_24h(s) {
        Some(t) => t.to_12h_string(),
        None => s.to_string(),
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TimeOfDay::parse(&s).ok_or_else(|| format!("invalid time of day '{}'", s))
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_24h_string()
    }
}
