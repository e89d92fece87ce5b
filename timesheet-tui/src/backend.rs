use async_trait::async_trait;

use timesheet_client::{DevBackend, HttpBackend};
use timesheet_core::grid::WeekWindow;
use timesheet_core::models::{
    CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TimeEntry,
};
use timesheet_core::{BackendError, TimesheetBackend};

/// The backend picked on the command line: the real API or dev data.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(HttpBackend),
    Dev(DevBackend),
}

impl Backend {
    pub fn is_dev(&self) -> bool {
        matches!(self, Backend::Dev(_))
    }
}

#[async_trait]
impl TimesheetBackend for Backend {
    async fn fetch_week_entries(&self, window: WeekWindow) -> Result<Vec<TimeEntry>, BackendError> {
        match self {
            Backend::Http(http) => http.fetch_week_entries(window).await,
            Backend::Dev(dev) => dev.fetch_week_entries(window).await,
        }
    }

    async fn fetch_active_projects(&self) -> Result<Vec<Project>, BackendError> {
        match self {
            Backend::Http(http) => http.fetch_active_projects().await,
            Backend::Dev(dev) => dev.fetch_active_projects().await,
        }
    }

    async fn fetch_phases(&self, project: ProjectId) -> Result<Vec<Phase>, BackendError> {
        match self {
            Backend::Http(http) => http.fetch_phases(project).await,
            Backend::Dev(dev) => dev.fetch_phases(project).await,
        }
    }

    async fn fetch_tasks(&self, phase: PhaseId) -> Result<Vec<Task>, BackendError> {
        match self {
            Backend::Http(http) => http.fetch_tasks(phase).await,
            Backend::Dev(dev) => dev.fetch_tasks(phase).await,
        }
    }

    async fn submit_entry(&self, command: &CreateEntryCommand) -> Result<EntryId, BackendError> {
        match self {
            Backend::Http(http) => http.submit_entry(command).await,
            Backend::Dev(dev) => dev.submit_entry(command).await,
        }
    }
}
