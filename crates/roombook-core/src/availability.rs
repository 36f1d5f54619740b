//! Slot availability for one room on one day.
//!
//! A pure function of (date, room, stored bookings, now). Each catalog slot
//! is treated as one hour wide for marking purposes. A booking covers the
//! minute marks `start, start + 60, ...` strictly below its end, and a slot
//! is taken when its start minute is one of those marks. Stepping is from
//! the raw start minute, so a booking at 10:00 for 30 minutes still takes
//! the 10:00 slot, and one starting at 10:30 takes no catalog slot at all.
//! A booking whose end wraps past midnight (end <= start) marks nothing.

use bitvec::prelude::*;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::booking::Booking;
use crate::time::{TimeOfDay, MINUTES_PER_DAY, MINUTES_PER_HOUR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Free,
    /// Covered by at least one booking for the same room and date
    Taken,
    /// The date is today and the slot start is at or before the current time
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub time: TimeOfDay,
    pub status: SlotStatus,
}

impl SlotAvailability {
    /// Only free slots can be clicked
    pub fn is_selectable(&self) -> bool {
        self.status == SlotStatus::Free
    }
}

/// Result shown for a day: the slot list, or a single indicator when no
/// slot is selectable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayAvailability {
    Open(Vec<SlotAvailability>),
    NoFreeSlots,
}

impl DayAvailability {
    pub fn has_free_slot(&self) -> bool {
        matches!(self, DayAvailability::Open(_))
    }
}

/// Classifies a fixed catalog of slot start times
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityCalculator<'a> {
    slots: &'a [TimeOfDay],
}

impl<'a> AvailabilityCalculator<'a> {
    pub fn new(slots: &'a [TimeOfDay]) -> Self {
        Self { slots }
    }

    /// Minute-of-day marks covered by bookings for `room` on `date`
    pub fn taken_minutes(&self, date: NaiveDate, room: &str, bookings: &[Booking]) -> BitVec {
        let mut taken = bitvec![0; MINUTES_PER_DAY as usize];
        for booking in bookings.iter().filter(|b| b.is_for(date, room)) {
            let (Some(start), Some(end)) = (booking.start(), booking.end()) else {
                tracing::debug!(date = %booking.date, time = %booking.time, "skipping booking with unparseable times");
                continue;
            };
            for mark in (start.minutes()..end.minutes()).step_by(MINUTES_PER_HOUR as usize) {
                taken.set(mark as usize, true);
            }
        }
        taken
    }

    /// Status of every catalog slot, in catalog order
    pub fn classify(
        &self,
        date: NaiveDate,
        room: &str,
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> Vec<SlotAvailability> {
        let taken = self.taken_minutes(date, room, bookings);
        let is_today = date == now.date();
        let now_time = TimeOfDay::from_minutes(now_minutes(now));

        self.slots
            .iter()
            .map(|&time| {
                let status = if is_today && time <= now_time {
                    SlotStatus::Past
                } else if taken[time.minutes() as usize] {
                    SlotStatus::Taken
                } else {
                    SlotStatus::Free
                };
                SlotAvailability { time, status }
            })
            .collect()
    }

    /// Classified slots, or [`DayAvailability::NoFreeSlots`] when none is selectable
    pub fn day(
        &self,
        date: NaiveDate,
        room: &str,
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> DayAvailability {
        let slots = self.classify(date, room, bookings, now);
        tracing::debug!(%date, room, free = slots.iter().filter(|s| s.is_selectable()).count(), "computed availability");
        if slots.iter().any(SlotAvailability::is_selectable) {
            DayAvailability::Open(slots)
        } else {
            DayAvailability::NoFreeSlots
        }
    }
}

fn now_minutes(now: NaiveDateTime) -> u32 {
    use chrono::Timelike;
    now.hour() * MINUTES_PER_HOUR + now.minute()
}

/// Heading shown above the slot list, e.g. `Available slots for 01/06/2024 in Room A`
pub fn slots_heading(date: NaiveDate, room: &str) -> String {
    format!("Available slots for {} in {}", date.format("%d/%m/%Y"), room)
}
