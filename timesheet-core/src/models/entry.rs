use time::{Date, Time};

use super::{EntryId, PhaseId, ProjectId, TaskId};
use crate::clock::{hours_from_minutes, minute_of_day, DateKey};
use crate::error::EntryError;

/// A recorded time entry as returned by the backend.
///
/// Entries never cross midnight: `start_time < end_time` on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: EntryId,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub project: Option<String>,
    pub project_phase: Option<String>,
    pub task: Option<String>,
    pub hours: f64,
}

impl TimeEntry {
    pub fn new(
        id: impl Into<EntryId>,
        date: Date,
        start_time: Time,
        end_time: Time,
    ) -> Result<Self, EntryError> {
        let id = id.into();
        let (start, end) = (minute_of_day(start_time), minute_of_day(end_time));
        if end <= start {
            return Err(EntryError {
                id,
                start: start_time,
                end: end_time,
            });
        }

        Ok(Self {
            id,
            date,
            start_time,
            end_time,
            project: None,
            project_phase: None,
            task: None,
            hours: hours_from_minutes(u32::from(end - start)),
        })
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.project_phase = Some(phase.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Override the derived hours with the backend's own figure.
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours = hours;
        self
    }

    pub fn date_key(&self) -> DateKey {
        DateKey::new(self.date)
    }

    pub fn start_minute(&self) -> u16 {
        minute_of_day(self.start_time)
    }

    pub fn end_minute(&self) -> u16 {
        minute_of_day(self.end_time)
    }

    /// Whether `minute` on `date` falls inside `[start, end)`.
    pub fn covers(&self, date: DateKey, minute: u16) -> bool {
        self.date_key() == date && self.start_minute() <= minute && minute < self.end_minute()
    }

    /// Display label such as "Alpha Project / Design / Wireframes".
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [&self.project, &self.project_phase, &self.task]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        if parts.is_empty() {
            "Internal Meeting".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

/// Command handed to the backend once a draft passes validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateEntryCommand {
    /// `ProjectId::INTERNAL` for internal meetings.
    pub project_id: ProjectId,
    pub phase_id: Option<PhaseId>,
    pub task_id: Option<TaskId>,
    pub date: DateKey,
    pub start_time: Time,
    pub end_time: Time,
    pub hours: f64,
    pub notes: String,
}

impl CreateEntryCommand {
    pub fn is_internal(&self) -> bool {
        self.project_id.is_internal()
    }
}
