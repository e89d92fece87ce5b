use time::macros::time;
use time::Time;

use crate::clock::Granularity;
use crate::error::ClockError;

/// Default width of a grid slot.
pub const DEFAULT_SLOT_GRANULARITY: Granularity = Granularity::HALF_HOUR;
/// Default step between start/end options in the entry form.
pub const DEFAULT_OPTION_STEP: Granularity = Granularity::QUARTER_HOUR;
/// Default shortest entry that can be submitted.
pub const DEFAULT_MINIMUM_DURATION: Granularity = Granularity::QUARTER_HOUR;

/// Shape of the weekly grid. Construct through [`GridSettings::new`] so the
/// visible hours always stay inside one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    slot: Granularity,
    /// First visible hour (inclusive).
    day_start_hour: u8,
    /// Last visible hour (exclusive).
    day_end_hour: u8,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SLOT_GRANULARITY,
            day_start_hour: 6,
            day_end_hour: 20,
        }
    }
}

impl GridSettings {
    pub fn new(slot: Granularity, day_start_hour: u8, day_end_hour: u8) -> Result<Self, ClockError> {
        if day_start_hour >= day_end_hour || day_end_hour > 24 {
            return Err(ClockError::InvalidDayRange {
                start: day_start_hour,
                end: day_end_hour,
            });
        }
        Ok(Self {
            slot,
            day_start_hour,
            day_end_hour,
        })
    }

    pub fn slot(&self) -> Granularity {
        self.slot
    }

    pub fn day_start_hour(&self) -> u8 {
        self.day_start_hour
    }

    pub fn day_end_hour(&self) -> u8 {
        self.day_end_hour
    }

    /// Start minute of every visible slot row.
    pub fn row_minutes(&self) -> impl Iterator<Item = u16> {
        let start = u16::from(self.day_start_hour) * 60;
        let end = u16::from(self.day_end_hour.min(24)) * 60;
        (start..end).step_by(usize::from(self.slot.as_minutes()))
    }
}

/// Time-picker behaviour of the entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub option_step: Granularity,
    pub minimum_duration: Granularity,
    pub default_start: Time,
    pub default_end: Time,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            option_step: DEFAULT_OPTION_STEP,
            minimum_duration: DEFAULT_MINIMUM_DURATION,
            default_start: time!(9:00),
            default_end: time!(17:00),
        }
    }
}

impl WorkflowSettings {
    pub fn with_option_step(mut self, step: Granularity) -> Self {
        self.option_step = step;
        self
    }

    pub fn with_minimum_duration(mut self, minimum: Granularity) -> Self {
        self.minimum_duration = minimum;
        self
    }
}
