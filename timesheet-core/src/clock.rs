//! Wall-clock helpers shared by the grid and the entry workflow.
//!
//! All comparisons happen in minutes since midnight on a calendar date that
//! was derived through a single [`TimeReference`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::ClockError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const WALL_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const WALL_TIME_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// The one time frame used to bucket entries, build week windows and decide
/// whether a slot lies in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeReference {
    #[default]
    Utc,
    Fixed(UtcOffset),
}

impl TimeReference {
    /// Resolve the machine's local offset once, falling back to UTC when it
    /// cannot be determined (e.g. once other threads are running).
    pub fn local_or_utc() -> Self {
        match UtcOffset::current_local_offset() {
            Ok(offset) => Self::Fixed(offset),
            Err(_) => Self::Utc,
        }
    }

    pub fn offset(&self) -> UtcOffset {
        match self {
            TimeReference::Utc => UtcOffset::UTC,
            TimeReference::Fixed(offset) => *offset,
        }
    }

    /// Wall-clock date and time of `instant` in this frame.
    pub fn wall_clock(&self, instant: OffsetDateTime) -> PrimitiveDateTime {
        let shifted = instant.to_offset(self.offset());
        PrimitiveDateTime::new(shifted.date(), shifted.time())
    }

    pub fn today(&self, instant: OffsetDateTime) -> Date {
        self.wall_clock(instant).date()
    }
}

/// A calendar date keyed by its `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(Date);

impl DateKey {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(&self) -> Date {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(DATE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for DateKey {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| ClockError::InvalidDate(s.to_string()))
    }
}

impl TryFrom<String> for DateKey {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<Date> for DateKey {
    fn from(date: Date) -> Self {
        Self(date)
    }
}

/// A step size in minutes that evenly divides an hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Granularity(u16);

impl Granularity {
    pub const FIVE_MINUTES: Granularity = Granularity(5);
    pub const QUARTER_HOUR: Granularity = Granularity(15);
    pub const HALF_HOUR: Granularity = Granularity(30);
    pub const HOUR: Granularity = Granularity(60);

    pub fn minutes(minutes: u16) -> Result<Self, ClockError> {
        if minutes == 0 || 60 % minutes != 0 {
            return Err(ClockError::InvalidGranularity(minutes));
        }
        Ok(Self(minutes))
    }

    pub const fn as_minutes(&self) -> u16 {
        self.0
    }

    /// Round `minute` up to the next multiple of this step.
    pub fn ceil(&self, minute: u16) -> u16 {
        minute.div_ceil(self.0) * self.0
    }

    /// Round `minute` down to the previous multiple of this step.
    pub fn floor(&self, minute: u16) -> u16 {
        minute - minute % self.0
    }
}

impl TryFrom<u16> for Granularity {
    type Error = ClockError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::minutes(value)
    }
}

impl From<Granularity> for u16 {
    fn from(granularity: Granularity) -> Self {
        granularity.0
    }
}

/// Minutes since midnight, ignoring seconds.
pub fn minute_of_day(time: Time) -> u16 {
    u16::from(time.hour()) * 60 + u16::from(time.minute())
}

/// The wall-clock time at `minute` minutes since midnight, if within the day.
pub fn time_at_minute(minute: u16) -> Option<Time> {
    if minute >= MINUTES_PER_DAY {
        return None;
    }
    Time::from_hms((minute / 60) as u8, (minute % 60) as u8, 0).ok()
}

/// Parse zero-padded `HH:MM` (or `HH:MM:SS`, seconds dropped).
pub fn parse_wall_time(input: &str) -> Result<Time, ClockError> {
    let invalid = || ClockError::InvalidTime(input.to_string());
    let trimmed = input.trim();
    let time = Time::parse(trimmed, WALL_TIME_FORMAT)
        .or_else(|_| Time::parse(trimmed, WALL_TIME_SECONDS_FORMAT))
        .map_err(|_| invalid())?;
    time.replace_second(0).map_err(|_| invalid())
}

/// A wall-clock time that displays as `HH:MM` in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime(pub Time);

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(WALL_TIME_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

/// `HH:MM` in 24-hour form.
pub fn format_wall_time(time: Time) -> String {
    WallTime(time).to_string()
}

/// `9:00 AM` style label used in time pickers.
pub fn format_12h(time: Time) -> String {
    let suffix = if time.hour() >= 12 { "PM" } else { "AM" };
    let hour = match time.hour() % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, time.minute(), suffix)
}

/// Decimal hours for a span of minutes, rounded to two decimals.
pub fn hours_from_minutes(minutes: u32) -> f64 {
    (f64::from(minutes) / 60.0 * 100.0).round() / 100.0
}

/// A selectable time in a start/end picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOption {
    pub value: Time,
    pub label: String,
}

impl TimeOption {
    fn at(value: Time) -> Self {
        Self {
            value,
            label: format_12h(value),
        }
    }
}

/// Every multiple of `step` in `[00:00, 24:00)`.
pub fn time_options(step: Granularity) -> Vec<TimeOption> {
    options_from(0, step)
}

/// Options at multiples of `step` that are at or after `minute`.
pub fn options_from(minute: u16, step: Granularity) -> Vec<TimeOption> {
    (step.ceil(minute)..MINUTES_PER_DAY)
        .step_by(usize::from(step.as_minutes()))
        .filter_map(time_at_minute)
        .map(TimeOption::at)
        .collect()
}
