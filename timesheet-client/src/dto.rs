use serde::{Deserialize, Serialize};
use thiserror::Error;

use timesheet_core::clock::{format_wall_time, parse_wall_time};
use timesheet_core::models::{CreateEntryCommand, Phase, Project, Task, TimeEntry};
use timesheet_core::{ClockError, DateKey, EntryError};

#[derive(Deserialize)]
pub struct TimesheetListDto {
    pub timesheets: Vec<TimeEntryDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryDto {
    pub id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub project: Option<String>,
    pub project_phase: Option<String>,
    pub task: Option<String>,
    pub hours: Option<f64>,
}

/// A timesheet row that cannot become a [`TimeEntry`].
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Interval(#[from] EntryError),
}

impl TryFrom<TimeEntryDto> for TimeEntry {
    type Error = RowError;

    fn try_from(dto: TimeEntryDto) -> Result<Self, Self::Error> {
        // Some rows carry a full timestamp; only the date part is used.
        let date: DateKey = dto.date.get(..10).unwrap_or(dto.date.as_str()).parse()?;
        let start = parse_wall_time(&dto.start_time)?;
        let end = parse_wall_time(&dto.end_time)?;

        let mut entry = TimeEntry::new(dto.id, date.date(), start, end)?;
        entry.project = dto.project;
        entry.project_phase = dto.project_phase;
        entry.task = dto.task;
        if let Some(hours) = dto.hours {
            entry = entry.with_hours(hours);
        }
        Ok(entry)
    }
}

#[derive(Deserialize)]
pub struct ProjectListDto {
    pub projects: Vec<ProjectDto>,
}

#[derive(Deserialize)]
pub struct ProjectDto {
    pub id: i64,
    pub name: String,
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Project::new(dto.id, dto.name)
    }
}

#[derive(Deserialize)]
pub struct PhaseListDto {
    pub phases: Vec<PhaseDto>,
}

#[derive(Deserialize)]
pub struct PhaseDto {
    pub id: i64,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl From<PhaseDto> for Phase {
    fn from(dto: PhaseDto) -> Self {
        Phase {
            id: dto.id.into(),
            name: dto.name,
            enabled: dto.enabled,
        }
    }
}

#[derive(Deserialize)]
pub struct TaskListDto {
    pub tasks: Vec<TaskDto>,
}

#[derive(Deserialize)]
pub struct TaskDto {
    pub id: i64,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Task {
            id: dto.id.into(),
            name: dto.name,
            enabled: dto.enabled,
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest<'a> {
    pub project_id: i64,
    pub phase_id: Option<i64>,
    pub task_id: Option<i64>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub hours: f64,
    pub notes: &'a str,
}

impl<'a> From<&'a CreateEntryCommand> for CreateEntryRequest<'a> {
    fn from(command: &'a CreateEntryCommand) -> Self {
        Self {
            project_id: command.project_id.as_i64(),
            phase_id: command.phase_id.map(|id| id.as_i64()),
            task_id: command.task_id.map(|id| id.as_i64()),
            date: command.date.to_string(),
            start_time: format_wall_time(command.start_time),
            end_time: format_wall_time(command.end_time),
            hours: command.hours,
            notes: &command.notes,
        }
    }
}

#[derive(Deserialize)]
pub struct CreatedEntryDto {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{date, time};
    use timesheet_core::models::ProjectId;

    #[test]
    fn parses_timesheet_rows() {
        let list: TimesheetListDto = serde_json::from_value(json!({
            "timesheets": [
                {
                    "id": 7,
                    "date": "2024-06-12",
                    "startTime": "09:00:00",
                    "endTime": "10:30",
                    "project": "Alpha Project",
                    "projectPhase": "Design",
                    "task": null,
                    "hours": 1.5
                }
            ]
        }))
        .unwrap();

        let entry = TimeEntry::try_from(list.timesheets[0].clone()).unwrap();
        assert_eq!(entry.date, date!(2024 - 06 - 12));
        assert_eq!(entry.start_time, time!(9:00));
        assert_eq!(entry.end_time, time!(10:30));
        assert_eq!(entry.label(), "Alpha Project / Design");
        assert_eq!(entry.hours, 1.5);
    }

    #[test]
    fn accepts_timestamp_dates() {
        let dto = TimeEntryDto {
            id: 1,
            date: "2024-06-12T00:00:00.000Z".to_string(),
            start_time: "13:00".to_string(),
            end_time: "14:00".to_string(),
            project: None,
            project_phase: None,
            task: None,
            hours: None,
        };
        let entry = TimeEntry::try_from(dto).unwrap();
        assert_eq!(entry.date, date!(2024 - 06 - 12));
        assert_eq!(entry.hours, 1.0);
    }

    #[test]
    fn rejects_inverted_rows() {
        let dto = TimeEntryDto {
            id: 1,
            date: "2024-06-12".to_string(),
            start_time: "14:00".to_string(),
            end_time: "13:00".to_string(),
            project: None,
            project_phase: None,
            task: None,
            hours: Some(-1.0),
        };
        assert!(matches!(TimeEntry::try_from(dto), Err(RowError::Interval(_))));
    }

    #[test]
    fn phases_default_to_enabled() {
        let list: PhaseListDto = serde_json::from_value(json!({
            "phases": [
                { "id": 1, "name": "Design" },
                { "id": 2, "name": "Legacy", "enabled": false }
            ]
        }))
        .unwrap();
        let phases: Vec<Phase> = list.phases.into_iter().map(Phase::from).collect();
        assert!(phases[0].enabled);
        assert!(!phases[1].enabled);
    }

    #[test]
    fn internal_command_serializes_with_project_zero() {
        let command = CreateEntryCommand {
            project_id: ProjectId::INTERNAL,
            phase_id: None,
            task_id: None,
            date: "2024-06-12".parse().unwrap(),
            start_time: time!(9:00),
            end_time: time!(9:45),
            hours: 0.75,
            notes: "standup".to_string(),
        };
        let body = serde_json::to_value(CreateEntryRequest::from(&command)).unwrap();
        assert_eq!(
            body,
            json!({
                "projectId": 0,
                "phaseId": null,
                "taskId": null,
                "date": "2024-06-12",
                "startTime": "09:00",
                "endTime": "09:45",
                "hours": 0.75,
                "notes": "standup"
            })
        );
    }
}
