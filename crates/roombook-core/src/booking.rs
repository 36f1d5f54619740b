use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::{Record, Table};
use crate::time::TimeOfDay;

/// ISO date format used for `date` fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One stored room booking.
///
/// Date and time fields are kept as the raw stored strings so that a
/// malformed value only disqualifies that record from availability
/// matching instead of failing the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Booking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Start, `HH:MM`
    pub time: String,
    /// Whole hours
    #[serde(deserialize_with = "lenient_hours")]
    pub duration: u32,
    /// Derived `HH:MM`, wraps past midnight
    pub end_time: String,
    pub description: String,
    /// Username of the creator, or `anonymous`
    pub booked_by: String,
    pub assigned_admin: Option<String>,
    /// ISO-8601 instant
    pub created_at: String,
}

impl Record for Booking {
    const TABLE: Table = Table::Bookings;
}

impl Booking {
    pub fn start(&self) -> Option<TimeOfDay> {
        TimeOfDay::parse(&self.time)
    }

    pub fn end(&self) -> Option<TimeOfDay> {
        TimeOfDay::parse(&self.end_time)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Whether the booking is for this room on this day. Unparseable
    /// dates never match.
    pub fn is_for(&self, date: NaiveDate, room: &str) -> bool {
        self.room == room && self.day() == Some(date)
    }

    /// One-line listing shown under the booking form
    pub fn summary(&self) -> String {
        let admin = self
            .assigned_admin
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("—");
        format!(
            "{} booked {} on {} {}–{} ({}h) — Admin: {}",
            self.name, self.room, self.date, self.time, self.end_time, self.duration, admin
        )
    }
}

/// Duration was historically stored as the raw select value (a string).
/// Numbers and numeric strings are both accepted; anything else reads as 0.
fn lenient_hours<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawHours {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match RawHours::deserialize(deserializer)? {
        RawHours::Number(n) if n.is_finite() && n >= 0.0 => n as u32,
        RawHours::Text(s) => s.trim().parse().unwrap_or(0),
        RawHours::Number(_) | RawHours::Other(_) => 0,
    })
}
