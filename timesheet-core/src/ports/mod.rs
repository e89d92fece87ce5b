use async_trait::async_trait;

use crate::error::BackendError;
use crate::grid::WeekWindow;
use crate::models::{CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TimeEntry};

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::MockBackend;

/// Outbound port for the timesheet service.
///
/// Implementations return the lists as the service has them; filtering
/// disabled phases and tasks happens in the workflow.
#[async_trait]
pub trait TimesheetBackend: Send + Sync + 'static {
    /// Entries recorded between the window's Monday and Sunday, inclusive.
    async fn fetch_week_entries(&self, window: WeekWindow) -> Result<Vec<TimeEntry>, BackendError>;

    async fn fetch_active_projects(&self) -> Result<Vec<Project>, BackendError>;

    async fn fetch_phases(&self, project: ProjectId) -> Result<Vec<Phase>, BackendError>;

    async fn fetch_tasks(&self, phase: PhaseId) -> Result<Vec<Task>, BackendError>;

    async fn submit_entry(&self, command: &CreateEntryCommand) -> Result<EntryId, BackendError>;
}
