use std::sync::Arc;

use time::{Date, Time};
use timesheet_core::clock::TimeOption;
use timesheet_core::workflow::{Category, EntrySession, EntryWorkflow, SessionEvent};
use timesheet_core::{DateKey, LookupKind, WorkflowError};

use super::FormField;
use crate::backend::Backend;

/// Categories offered by the category picker, in display order.
pub const CATEGORIES: [Category; 2] = [Category::Project, Category::Internal];

/// The entry form: an [`EntrySession`] plus the picker cursors and focus
/// the terminal needs on top of it.
pub struct EntryForm {
    session: EntrySession<Backend>,
    focus: FormField,
    category_cursor: usize,
    project_cursor: usize,
    phase_cursor: usize,
    task_cursor: usize,
}

impl EntryForm {
    pub fn new(backend: Arc<Backend>, workflow: EntryWorkflow) -> Self {
        Self {
            session: EntrySession::new(backend, workflow),
            focus: FormField::Category,
            category_cursor: 0,
            project_cursor: 0,
            phase_cursor: 0,
            task_cursor: 0,
        }
    }

    pub fn workflow(&self) -> &EntryWorkflow {
        self.session.workflow()
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    /// Highlighted row of a picker field.
    pub fn cursor(&self, field: FormField) -> usize {
        match field {
            FormField::Category => self.category_cursor,
            FormField::Project => self.project_cursor,
            FormField::Phase => self.phase_cursor,
            FormField::Task => self.task_cursor,
            _ => 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.session.has_pending()
    }

    /// Fields currently shown, top to bottom. Dependent pickers appear once
    /// their parent is chosen; an empty list hides its picker.
    pub fn fields(&self) -> Vec<FormField> {
        let workflow = self.workflow();
        let mut fields = vec![FormField::Category];
        if workflow.category() == Category::Project {
            fields.push(FormField::Project);
        }
        if workflow
            .phases()
            .is_some_and(|phases| !(phases.is_ready() && phases.items().is_empty()))
        {
            fields.push(FormField::Phase);
        }
        if workflow
            .tasks()
            .is_some_and(|tasks| !(tasks.is_ready() && tasks.items().is_empty()))
        {
            fields.push(FormField::Task);
        }
        fields.push(FormField::Date);
        if workflow.time_inputs_visible() {
            fields.extend([
                FormField::Start,
                FormField::End,
                FormField::Notes,
                FormField::Save,
            ]);
        }
        fields
    }

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: isize) {
        let fields = self.fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(fields.len().saturating_sub(1));
        if let Some(field) = fields.get(next) {
            self.focus = *field;
        }
    }

    /// Keep focus on a visible field after fields appeared or vanished.
    fn settle_focus(&mut self) {
        let fields = self.fields();
        if fields.contains(&self.focus) {
            return;
        }
        self.focus = fields
            .iter()
            .rev()
            .find(|f| **f < self.focus)
            .copied()
            .unwrap_or(FormField::Category);
    }

    fn sync_cursors(&mut self) {
        let workflow = self.session.workflow();
        let selected = |position: Option<usize>, cursor: usize, len: usize| {
            position.unwrap_or_else(|| cursor.min(len.saturating_sub(1)))
        };

        if let Some(projects) = workflow.projects() {
            let items = projects.items();
            let position = workflow
                .selected_project()
                .and_then(|id| items.iter().position(|p| p.id == id));
            self.project_cursor = selected(position, self.project_cursor, items.len());
        }
        if let Some(phases) = workflow.phases() {
            let items = phases.items();
            let position = workflow
                .selected_phase()
                .and_then(|id| items.iter().position(|p| p.id == id));
            self.phase_cursor = selected(position, self.phase_cursor, items.len());
        }
        if let Some(tasks) = workflow.tasks() {
            let items = tasks.items();
            let position = workflow
                .selected_task()
                .and_then(|id| items.iter().position(|t| t.id == id));
            self.task_cursor = selected(position, self.task_cursor, items.len());
        }
        if let Some(position) = CATEGORIES.iter().position(|c| *c == workflow.category()) {
            self.category_cursor = position;
        }
    }

    /// Left/right on the focused field: move a picker highlight, or step
    /// the date or a time.
    pub fn cycle(&mut self, delta: isize, today: Date) -> Result<(), WorkflowError> {
        match self.focus {
            FormField::Category => {
                self.category_cursor = wrap(self.category_cursor, delta, CATEGORIES.len());
            }
            FormField::Project => {
                let len = self.workflow().projects().map_or(0, |l| l.items().len());
                self.project_cursor = wrap(self.project_cursor, delta, len);
            }
            FormField::Phase => {
                let len = self.workflow().phases().map_or(0, |l| l.items().len());
                self.phase_cursor = wrap(self.phase_cursor, delta, len);
            }
            FormField::Task => {
                let len = self.workflow().tasks().map_or(0, |l| l.items().len());
                self.task_cursor = wrap(self.task_cursor, delta, len);
            }
            FormField::Date => {
                let current = self.workflow().work_date().date();
                let next = if delta > 0 {
                    current.next_day()
                } else {
                    current.previous_day()
                };
                if let Some(next) = next {
                    self.session.set_work_date(DateKey::new(next), today)?;
                }
            }
            FormField::Start => {
                let workflow = self.workflow();
                if let Some(start) = step_option(&workflow.time_options(), workflow.start_time(), delta) {
                    self.session.set_start_time(start)?;
                }
            }
            FormField::End => {
                let workflow = self.workflow();
                if let Some(end) = step_option(&workflow.end_options(), workflow.end_time(), delta) {
                    self.session.set_end_time(end)?;
                }
            }
            FormField::Notes | FormField::Save => {}
        }
        Ok(())
    }

    /// Enter on the focused field: commit a picker highlight or save.
    pub fn confirm(&mut self) -> Result<(), WorkflowError> {
        match self.focus {
            FormField::Category => {
                self.session.select_category(CATEGORIES[self.category_cursor])?;
            }
            FormField::Project => {
                let id = self
                    .workflow()
                    .projects()
                    .and_then(|l| l.items().get(self.project_cursor))
                    .map(|p| p.id)
                    .ok_or(WorkflowError::NotLoaded(LookupKind::Projects))?;
                self.session.select_project(id)?;
            }
            FormField::Phase => {
                let id = self
                    .workflow()
                    .phases()
                    .and_then(|l| l.items().get(self.phase_cursor))
                    .map(|p| p.id)
                    .ok_or(WorkflowError::NotLoaded(LookupKind::Phases))?;
                self.session.select_phase(id)?;
            }
            FormField::Task => {
                let id = self
                    .workflow()
                    .tasks()
                    .and_then(|l| l.items().get(self.task_cursor))
                    .map(|t| t.id)
                    .ok_or(WorkflowError::NotLoaded(LookupKind::Tasks))?;
                self.session.select_task(id)?;
            }
            FormField::Save => return self.submit(),
            FormField::Date | FormField::Start | FormField::End | FormField::Notes => {}
        }
        self.sync_cursors();
        self.focus_next();
        Ok(())
    }

    pub fn submit(&mut self) -> Result<(), WorkflowError> {
        self.session.submit()
    }

    pub fn input_char(&mut self, c: char) -> Result<(), WorkflowError> {
        let mut notes = self.workflow().notes().to_string();
        notes.push(c);
        self.session.set_notes(notes)
    }

    pub fn backspace(&mut self) -> Result<(), WorkflowError> {
        let mut notes = self.workflow().notes().to_string();
        notes.pop();
        self.session.set_notes(notes)
    }

    /// Step back to the category picker. `false` when already there, so
    /// the caller can close the form instead.
    pub fn back(&mut self) -> Result<bool, WorkflowError> {
        if self.workflow().category() == Category::None {
            return Ok(false);
        }
        self.session.back()?;
        self.focus = FormField::Category;
        Ok(true)
    }

    /// Apply finished lookups and saves. Never blocks.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let events = self.session.pump();
        if !events.is_empty() {
            self.sync_cursors();
            self.settle_focus();
        }
        events
    }
}

fn wrap(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (cursor as isize + delta).rem_euclid(len as isize) as usize
}

/// The option `delta` steps away from `current`. A current value between
/// options snaps to the neighbour in the direction of travel.
fn step_option(options: &[TimeOption], current: Option<Time>, delta: isize) -> Option<Time> {
    let Some(current) = current else {
        return options.first().map(|o| o.value);
    };
    let picked = match options.iter().position(|o| o.value == current) {
        Some(idx) => options.get(idx.saturating_add_signed(delta).min(options.len() - 1)),
        None if delta > 0 => options.iter().find(|o| o.value > current),
        None => options.iter().rev().find(|o| o.value < current),
    };
    picked.map(|o| o.value)
}
