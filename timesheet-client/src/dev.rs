use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use time::macros::time;
use time::{Date, Duration as DateDuration, Time};
use tracing::{debug, info};

use timesheet_core::grid::WeekWindow;
use timesheet_core::models::{
    CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TimeEntry,
};
use timesheet_core::{BackendError, TimesheetBackend};

/// In-memory backend with a seeded week, used by `timesheet-tui dev`.
#[derive(Debug, Clone)]
pub struct DevBackend {
    store: Arc<Mutex<DevStore>>,
    latency: Option<Duration>,
}

#[derive(Debug)]
struct DevStore {
    entries: Vec<TimeEntry>,
    next_id: i64,
}

impl DevBackend {
    /// Seed entries on the working days of `today`'s week up to and
    /// including `today`.
    pub fn new(today: Date) -> Self {
        let entries = seed_dev_entries(today);
        let next_id = entries.len() as i64 + 1;
        Self {
            store: Arc::new(Mutex::new(DevStore { entries, next_id })),
            latency: None,
        }
    }

    /// Delay every call, to exercise loading states.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency).filter(|d| !d.is_zero());
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, DevStore>, BackendError> {
        self.store
            .lock()
            .map_err(|_| BackendError::request("dev store is unavailable after a panic"))
    }
}

fn dev_projects() -> Vec<Project> {
    vec![
        Project::new(1, "Nordic Crisis Manager"),
        Project::new(2, "Azure DevOps Integration"),
        Project::new(3, "Internal Tooling"),
    ]
}

fn dev_phases() -> HashMap<ProjectId, Vec<Phase>> {
    HashMap::from([
        (
            ProjectId::new(1),
            vec![
                Phase::new(10, "Development"),
                Phase::new(11, "Maintenance"),
                Phase::new(12, "Legacy Support").disabled(),
            ],
        ),
        (ProjectId::new(2), vec![Phase::new(20, "Integration")]),
    ])
}

fn dev_tasks() -> HashMap<PhaseId, Vec<Task>> {
    HashMap::from([
        (
            PhaseId::new(10),
            vec![
                Task::new(100, "Backend Development"),
                Task::new(101, "Code Review"),
                Task::new(102, "Old Reports").disabled(),
            ],
        ),
        (PhaseId::new(11), vec![Task::new(110, "Bug Fixing")]),
    ])
}

fn seed_dev_entries(today: Date) -> Vec<TimeEntry> {
    let monday = WeekWindow::containing(today).monday();
    let rows: [(i64, Time, Time, Option<(&str, &str, &str)>); 5] = [
        (0, time!(8:00), time!(10:00), Some(("Nordic Crisis Manager", "Development", "Backend Development"))),
        (0, time!(10:00), time!(10:30), None),
        (1, time!(13:00), time!(15:30), Some(("Azure DevOps Integration", "Integration", ""))),
        (2, time!(9:00), time!(10:30), Some(("Nordic Crisis Manager", "Maintenance", "Bug Fixing"))),
        (3, time!(14:00), time!(16:00), Some(("Internal Tooling", "", ""))),
    ];

    rows.into_iter()
        .filter_map(|(offset, start, end, names)| {
            let date = monday + DateDuration::days(offset);
            (date <= today).then_some((date, start, end, names))
        })
        .enumerate()
        .filter_map(|(idx, (date, start, end, names))| {
            let entry = TimeEntry::new(idx as i64 + 1, date, start, end).ok()?;
            Some(match names {
                Some((project, phase, task)) => {
                    let mut entry = entry.with_project(project);
                    entry.project_phase = Some(phase.to_string()).filter(|s| !s.is_empty());
                    entry.task = Some(task.to_string()).filter(|s| !s.is_empty());
                    entry
                }
                None => entry,
            })
        })
        .collect()
}

#[async_trait]
impl TimesheetBackend for DevBackend {
    async fn fetch_week_entries(&self, window: WeekWindow) -> Result<Vec<TimeEntry>, BackendError> {
        self.simulate_latency().await;
        let store = self.store()?;
        Ok(store
            .entries
            .iter()
            .filter(|entry| window.contains(entry.date))
            .cloned()
            .collect())
    }

    async fn fetch_active_projects(&self) -> Result<Vec<Project>, BackendError> {
        self.simulate_latency().await;
        Ok(dev_projects())
    }

    async fn fetch_phases(&self, project: ProjectId) -> Result<Vec<Phase>, BackendError> {
        self.simulate_latency().await;
        Ok(dev_phases().remove(&project).unwrap_or_default())
    }

    async fn fetch_tasks(&self, phase: PhaseId) -> Result<Vec<Task>, BackendError> {
        self.simulate_latency().await;
        Ok(dev_tasks().remove(&phase).unwrap_or_default())
    }

    async fn submit_entry(&self, command: &CreateEntryCommand) -> Result<EntryId, BackendError> {
        self.simulate_latency().await;

        let project = dev_projects()
            .into_iter()
            .find(|p| p.id == command.project_id)
            .map(|p| p.name);
        let phase = command.phase_id.and_then(|id| {
            dev_phases()
                .into_values()
                .flatten()
                .find(|p| p.id == id)
                .map(|p| p.name)
        });
        let task = command.task_id.and_then(|id| {
            dev_tasks()
                .into_values()
                .flatten()
                .find(|t| t.id == id)
                .map(|t| t.name)
        });

        let mut store = self.store()?;
        let id = EntryId::new(store.next_id);
        let mut entry = TimeEntry::new(id, command.date.date(), command.start_time, command.end_time)
            .map_err(|e| BackendError::request(e.to_string()))?
            .with_hours(command.hours);
        entry.project = project;
        entry.project_phase = phase;
        entry.task = task;

        debug!(?entry, "storing dev entry");
        store.entries.push(entry);
        store.next_id += 1;
        info!(%id, "dev entry created");
        Ok(id)
    }
}
