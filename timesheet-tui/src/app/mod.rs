use std::sync::Arc;

use time::OffsetDateTime;
use timesheet_core::clock::minute_of_day;
use timesheet_core::grid::{DaySummary, SlotSelection, WeekGrid, WeekWindow};
use timesheet_core::models::TimeEntry;
use timesheet_core::workflow::EntryWorkflow;
use timesheet_core::{DateKey, WeekGridEngine, WorkflowSettings};

use crate::backend::Backend;

mod form;
mod state;
pub use form::{EntryForm, CATEGORIES};
pub use state::{FormField, GridCursor, View};

pub struct App {
    pub running: bool,
    pub current_view: View,
    pub status_message: Option<String>,
    pub is_loading: bool,

    // Week grid
    pub engine: WeekGridEngine,
    pub week: WeekWindow,
    pub entries: Vec<TimeEntry>,
    pub cursor: GridCursor,

    // Entry form
    pub workflow_settings: WorkflowSettings,
    pub form: Option<EntryForm>,

    backend: Arc<Backend>,
}

impl App {
    pub fn new(
        backend: Arc<Backend>,
        engine: WeekGridEngine,
        workflow_settings: WorkflowSettings,
        now: OffsetDateTime,
    ) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Week,
            status_message: None,
            is_loading: false,
            engine,
            week: engine.week_window(now),
            entries: Vec::new(),
            cursor: GridCursor::default(),
            workflow_settings,
            form: None,
            backend,
        };
        app.focus_now(now);
        app
    }

    pub fn backend(&self) -> Arc<Backend> {
        self.backend.clone()
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn grid(&self, now: OffsetDateTime) -> WeekGrid {
        self.engine.build(&self.entries, now)
    }

    pub fn summaries(&self, now: OffsetDateTime) -> [DaySummary; 7] {
        self.engine.summaries(&self.entries, now)
    }

    /// Replace the week's entries after a fetch.
    pub fn update_entries(&mut self, week: WeekWindow, entries: Vec<TimeEntry>) {
        self.week = week;
        self.entries = entries;
    }

    /// Put the cursor on today's slot for the current time, or the
    /// nearest visible row.
    pub fn focus_now(&mut self, now: OffsetDateTime) {
        let reference = self.engine.reference();
        let wall = reference.wall_clock(now);
        let grid = self.grid(now);
        let rows = grid.rows().len();
        let minute = minute_of_day(wall.time());

        let row = grid.row_of(minute).unwrap_or_else(|| {
            let first = grid.rows().first().map_or(0, |r| r.minute);
            if minute < first {
                0
            } else {
                rows.saturating_sub(1)
            }
        });
        let day = grid.window().index_of(wall.date()).unwrap_or(0);
        self.cursor = GridCursor { row, day };
    }

    pub fn move_cursor(&mut self, d_row: isize, d_day: isize, now: OffsetDateTime) {
        let rows = self.grid(now).rows().len();
        self.cursor = self.cursor.moved(rows, d_row, d_day);
    }

    /// Open the entry form seeded from the slot under the cursor. Occupied
    /// and future slots do nothing.
    pub fn activate_cursor(&mut self, now: OffsetDateTime) -> bool {
        let grid = self.grid(now);
        let Some(cell) = grid.cell(self.cursor.row, self.cursor.day) else {
            return false;
        };

        let mut selection: Option<SlotSelection> = None;
        self.engine
            .on_slot_activate(cell.slot, &self.entries, now, |s| selection = Some(s));

        match selection {
            Some(selection) => {
                let workflow = EntryWorkflow::seeded(
                    self.workflow_settings,
                    selection,
                    self.engine.settings().slot(),
                );
                self.open_form(workflow);
                true
            }
            None => false,
        }
    }

    /// Open an empty entry form for today.
    pub fn open_new_entry(&mut self, now: OffsetDateTime) {
        let today = self.engine.reference().today(now);
        let workflow = EntryWorkflow::new(self.workflow_settings, DateKey::new(today));
        self.open_form(workflow);
    }

    fn open_form(&mut self, workflow: EntryWorkflow) {
        self.form = Some(EntryForm::new(self.backend.clone(), workflow));
        self.current_view = View::Entry;
        self.clear_status();
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.current_view = View::Week;
    }
}
