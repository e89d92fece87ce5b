//! Weekly slot grid: which slots are taken, which lie in the future, and
//! what a click on a free slot hands to the entry form.

mod slot;
mod window;

use std::collections::BTreeMap;

use time::{Date, OffsetDateTime};

pub use slot::{slot_state, SlotSelection, SlotState, TimeSlot};
pub use window::{compute_week_window, WeekWindow};

use crate::clock::{hours_from_minutes, time_at_minute, DateKey, Granularity, TimeReference};
use crate::models::TimeEntry;
use crate::settings::GridSettings;

/// Derives slot state for the current week.
///
/// Holds the one [`TimeReference`] every comparison goes through, so a date
/// key built for the window is the same key an entry is bucketed under.
#[derive(Debug, Clone, Copy)]
pub struct WeekGridEngine {
    reference: TimeReference,
    settings: GridSettings,
}

impl WeekGridEngine {
    pub fn new(reference: TimeReference, settings: GridSettings) -> Self {
        Self {
            reference,
            settings,
        }
    }

    pub fn reference(&self) -> TimeReference {
        self.reference
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn week_window(&self, now: OffsetDateTime) -> WeekWindow {
        compute_week_window(now, self.reference)
    }

    pub fn slot_state(&self, slot: TimeSlot, entries: &[TimeEntry], now: OffsetDateTime) -> SlotState {
        slot_state(slot, entries, self.reference.wall_clock(now))
    }

    /// Invoke `on_select` for a selectable slot. Returns whether it fired.
    pub fn on_slot_activate<F>(
        &self,
        slot: TimeSlot,
        entries: &[TimeEntry],
        now: OffsetDateTime,
        on_select: F,
    ) -> bool
    where
        F: FnOnce(SlotSelection),
    {
        if !self.slot_state(slot, entries, now).selectable {
            tracing::debug!(date = %slot.date_key(), minute = slot.minute_of_day(), "ignoring activation of unselectable slot");
            return false;
        }
        on_select(SlotSelection::from(slot));
        true
    }

    /// Entries recorded on `date`, ordered by start time.
    pub fn entries_for_date<'a>(&self, date: Date, entries: &'a [TimeEntry]) -> Vec<&'a TimeEntry> {
        entries_for_date(DateKey::new(date), entries)
    }

    /// Slot states for every visible row of the week containing `now`.
    pub fn build(&self, entries: &[TimeEntry], now: OffsetDateTime) -> WeekGrid {
        let window = self.week_window(now);
        let wall_now = self.reference.wall_clock(now);
        let occupancy = Occupancy::index(entries);

        let rows = self
            .settings
            .row_minutes()
            .filter_map(|minute| {
                let start = time_at_minute(minute)?;
                let cells = window.days().map(|date| {
                    let slot = TimeSlot::starting_at(date, start);
                    let occupied = occupancy.is_occupied(slot);
                    let future = slot.starts_at() > wall_now;
                    SlotCell {
                        slot,
                        state: SlotState::new(occupied, future),
                    }
                });
                Some(SlotRow { minute, cells })
            })
            .collect();

        WeekGrid {
            window,
            slot: self.settings.slot(),
            rows,
        }
    }

    /// Per-day entry lists and totals for the week containing `now`.
    pub fn summaries(&self, entries: &[TimeEntry], now: OffsetDateTime) -> [DaySummary; 7] {
        self.week_window(now).days().map(|date| {
            let day: Vec<TimeEntry> = self
                .entries_for_date(date, entries)
                .into_iter()
                .cloned()
                .collect();
            let minutes: u32 = day
                .iter()
                .map(|entry| u32::from(entry.end_minute() - entry.start_minute()))
                .sum();
            DaySummary {
                date,
                entries: day,
                total_hours: hours_from_minutes(minutes),
            }
        })
    }
}

/// Entries whose date key equals `key`, ordered by start time.
pub fn entries_for_date(key: DateKey, entries: &[TimeEntry]) -> Vec<&TimeEntry> {
    let mut matching: Vec<&TimeEntry> = entries
        .iter()
        .filter(|entry| entry.date_key() == key)
        .collect();
    matching.sort_by_key(|entry| (entry.start_time, entry.end_time));
    matching
}

/// Entry intervals bucketed by date key for one grid build.
struct Occupancy {
    by_date: BTreeMap<DateKey, Vec<(u16, u16)>>,
}

impl Occupancy {
    fn index(entries: &[TimeEntry]) -> Self {
        let mut by_date: BTreeMap<DateKey, Vec<(u16, u16)>> = BTreeMap::new();
        for entry in entries {
            by_date
                .entry(entry.date_key())
                .or_default()
                .push((entry.start_minute(), entry.end_minute()));
        }
        Self { by_date }
    }

    fn is_occupied(&self, slot: TimeSlot) -> bool {
        let minute = slot.minute_of_day();
        self.by_date
            .get(&slot.date_key())
            .is_some_and(|spans| spans.iter().any(|&(start, end)| start <= minute && minute < end))
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCell {
    pub slot: TimeSlot,
    pub state: SlotState,
}

/// All seven cells that start at the same minute of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRow {
    pub minute: u16,
    pub cells: [SlotCell; 7],
}

/// Slot states of one week, rows by time of day and columns Monday..Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekGrid {
    window: WeekWindow,
    slot: Granularity,
    rows: Vec<SlotRow>,
}

impl WeekGrid {
    pub fn window(&self) -> WeekWindow {
        self.window
    }

    pub fn slot_granularity(&self) -> Granularity {
        self.slot
    }

    pub fn rows(&self) -> &[SlotRow] {
        &self.rows
    }

    pub fn cell(&self, row: usize, day: usize) -> Option<&SlotCell> {
        self.rows.get(row).and_then(|r| r.cells.get(day))
    }

    /// Row index of the slot containing `minute`, if visible.
    pub fn row_of(&self, minute: u16) -> Option<usize> {
        let floored = self.slot.floor(minute);
        self.rows.iter().position(|row| row.minute == floored)
    }

    pub fn selectable_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.state.selectable)
            .count()
    }
}

/// Read-only list of one day's entries, shown beside the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: Date,
    pub entries: Vec<TimeEntry>,
    pub total_hours: f64,
}
