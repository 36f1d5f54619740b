use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

use crate::booking::DATE_FORMAT;
use crate::error::CalendarError;

/// One clickable day cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub day: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Strictly before today; not selectable
    pub past: bool,
    pub today: bool,
}

/// Month view: leading blank cells so the 1st lands on its weekday
/// column (Sunday first), followed by one cell per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthGrid {
    pub fn build(year: i32, month: u32, today: NaiveDate) -> Result<Self, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        let days = days_in_month(first);

        let days = (1..=days)
            .filter_map(|day| first.with_day(day))
            .map(|date| CalendarDay {
                day: date.day(),
                date: date.format(DATE_FORMAT).to_string(),
                past: date < today,
                today: date == today,
            })
            .collect();

        Ok(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }

    /// Date of a clicked day, or None for past or out-of-range days
    pub fn select(&self, day: u32) -> Option<NaiveDate> {
        let cell = self.days.iter().find(|c| c.day == day)?;
        if cell.past {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|n| n.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

/// English month name for a 1-based month, empty if out of range
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

/// Month selector entries: (1-based month, name)
pub fn month_options() -> Vec<(u32, &'static str)> {
    (1..=12).map(|m| (m, month_name(m))).collect()
}

/// Year selector entries: last year through two years ahead
pub fn year_options(today: NaiveDate) -> Vec<i32> {
    let year = today.year();
    (year - 1..=year + 2).collect()
}

/// Parse a `YYYY-MM-DD` date coming from the UI
pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| CalendarError::InvalidDate(input.to_string()))
}
