use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MINUTES_PER_DAY: u32 = 1440;
pub const MINUTES_PER_HOUR: u32 = 60;

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Optional seconds are accepted and ignored (time inputs with a step emit them)
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2}):(\d{1,2})(?::\d{1,2})?\s*$").expect("time pattern is valid")
    })
}

/// Wall-clock time of day with minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Create from hour and minute. Returns None if out of range.
    pub const fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(TimeOfDay(hour * MINUTES_PER_HOUR + minute))
        } else {
            None
        }
    }

    /// Create from minutes since midnight, wrapping modulo one day
    pub const fn from_minutes(minutes: u32) -> Self {
        TimeOfDay(minutes % MINUTES_PER_DAY)
    }

    /// Parse `HH:MM` (24h). Single-digit fields are tolerated.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = time_pattern().captures(input)?;
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        Self::new(hour, minute)
    }

    pub const fn minutes(self) -> u32 {
        self.0
    }

    pub const fn hour(self) -> u32 {
        self.0 / MINUTES_PER_HOUR
    }

    pub const fn minute(self) -> u32 {
        self.0 % MINUTES_PER_HOUR
    }

    /// Add whole hours, wrapping past midnight.
    pub const fn add_hours(self, hours: u32) -> Self {
        Self::from_minutes(self.0 + (hours % 24) * MINUTES_PER_HOUR)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse(s).ok_or_else(|| s.to_string())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day: {raw}")))
    }
}

/// End time of a booking: `(start + duration * 60) mod 1440`, as `HH:MM`.
pub fn end_time(start: TimeOfDay, duration_hours: u32) -> TimeOfDay {
    start.add_hours(duration_hours)
}

/// Form-facing variant of [`end_time`] working on raw input.
///
/// Returns an empty string when either input is missing or unparseable,
/// which is what the read-only end time field shows in that case.
pub fn end_time_label(start: &str, duration: &str) -> String {
    let Some(start) = TimeOfDay::parse(start) else {
        return String::new();
    };
    match parse_duration(duration) {
        Some(hours) => end_time(start, hours).to_string(),
        None => String::new(),
    }
}

/// Parse a duration in whole hours. Zero and non-numeric input are rejected.
pub fn parse_duration(input: &str) -> Option<u32> {
    match input.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(hours) => Some(hours),
    }
}
