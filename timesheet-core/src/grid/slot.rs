use time::{Date, PrimitiveDateTime, Time};

use crate::clock::{minute_of_day, time_at_minute, DateKey};
use crate::models::TimeEntry;

/// A fixed-width interval on a calendar date, identified by its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    date: Date,
    minute: u16,
}

impl TimeSlot {
    /// `None` unless `hour < 24` and `minute < 60`.
    pub fn new(date: Date, hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self {
            date,
            minute: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    pub fn at_minute(date: Date, minute_of_day: u16) -> Option<Self> {
        Self::new(date, (minute_of_day / 60) as u8, (minute_of_day % 60) as u8)
    }

    pub fn starting_at(date: Date, start: Time) -> Self {
        Self {
            date,
            minute: minute_of_day(start),
        }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn date_key(&self) -> DateKey {
        DateKey::new(self.date)
    }

    pub fn hour(&self) -> u8 {
        (self.minute / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minute % 60) as u8
    }

    pub fn minute_of_day(&self) -> u16 {
        self.minute
    }

    pub fn start_time(&self) -> Time {
        time_at_minute(self.minute).unwrap_or(Time::MIDNIGHT)
    }

    pub fn starts_at(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.date, self.start_time())
    }
}

/// Derived state of a slot. Recomputed from the entry list on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotState {
    pub occupied: bool,
    pub future: bool,
    pub selectable: bool,
}

impl SlotState {
    pub fn new(occupied: bool, future: bool) -> Self {
        Self {
            occupied,
            future,
            selectable: !occupied && !future,
        }
    }
}

/// What a slot activation reports to the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    pub date: DateKey,
    pub hour: u8,
    pub minute: u8,
}

impl From<TimeSlot> for SlotSelection {
    fn from(slot: TimeSlot) -> Self {
        Self {
            date: slot.date_key(),
            hour: slot.hour(),
            minute: slot.minute(),
        }
    }
}

/// Occupancy and future-ness of `slot`.
///
/// `now` is the wall clock in the same reference the entry dates were
/// bucketed in. A slot starting exactly at `now` is not in the future.
pub fn slot_state(slot: TimeSlot, entries: &[TimeEntry], now: PrimitiveDateTime) -> SlotState {
    let key = slot.date_key();
    let occupied = entries
        .iter()
        .any(|entry| entry.covers(key, slot.minute_of_day()));
    let future = slot.starts_at() > now;
    SlotState::new(occupied, future)
}
