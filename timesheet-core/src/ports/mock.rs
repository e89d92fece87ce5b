//! In-memory backend for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::TimesheetBackend;
use crate::error::BackendError;
use crate::grid::WeekWindow;
use crate::models::{CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TimeEntry};

#[derive(Default)]
struct MockState {
    entries: Vec<TimeEntry>,
    projects: Vec<Project>,
    phases: HashMap<ProjectId, Vec<Phase>>,
    tasks: HashMap<PhaseId, Vec<Task>>,
    failing_phases: HashMap<ProjectId, BackendError>,
    submit_error: Option<BackendError>,
    phase_gates: HashMap<ProjectId, Arc<Notify>>,
    phase_calls: Vec<ProjectId>,
    submitted: Vec<CreateEntryCommand>,
}

/// Mock backend with canned lists, per-project failures and gates that hold
/// a phases response until the test releases it.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(self, entries: Vec<TimeEntry>) -> Self {
        self.state.lock().unwrap().entries = entries;
        self
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.state.lock().unwrap().projects = projects;
        self
    }

    pub fn with_phases(self, project: impl Into<ProjectId>, phases: Vec<Phase>) -> Self {
        self.state.lock().unwrap().phases.insert(project.into(), phases);
        self
    }

    pub fn with_tasks(self, phase: impl Into<PhaseId>, tasks: Vec<Task>) -> Self {
        self.state.lock().unwrap().tasks.insert(phase.into(), tasks);
        self
    }

    /// Make phase fetches for `project` fail until [`Self::heal_phases`].
    pub fn fail_phases(&self, project: impl Into<ProjectId>, error: BackendError) {
        self.state
            .lock()
            .unwrap()
            .failing_phases
            .insert(project.into(), error);
    }

    pub fn heal_phases(&self, project: impl Into<ProjectId>) {
        self.state
            .lock()
            .unwrap()
            .failing_phases
            .remove(&project.into());
    }

    pub fn fail_submit(&self, error: Option<BackendError>) {
        self.state.lock().unwrap().submit_error = error;
    }

    /// Hold phase responses for `project` until the returned gate is notified.
    pub fn gate_phases(&self, project: impl Into<ProjectId>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .phase_gates
            .insert(project.into(), gate.clone());
        gate
    }

    pub fn phase_calls(&self) -> Vec<ProjectId> {
        self.state.lock().unwrap().phase_calls.clone()
    }

    pub fn submitted(&self) -> Vec<CreateEntryCommand> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl TimesheetBackend for MockBackend {
    async fn fetch_week_entries(&self, window: WeekWindow) -> Result<Vec<TimeEntry>, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .filter(|entry| window.contains(entry.date))
            .cloned()
            .collect())
    }

    async fn fetch_active_projects(&self) -> Result<Vec<Project>, BackendError> {
        Ok(self.state.lock().unwrap().projects.clone())
    }

    async fn fetch_phases(&self, project: ProjectId) -> Result<Vec<Phase>, BackendError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.phase_calls.push(project);
            state.phase_gates.get(&project).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.state.lock().unwrap();
        if let Some(error) = state.failing_phases.get(&project) {
            return Err(error.clone());
        }
        Ok(state.phases.get(&project).cloned().unwrap_or_default())
    }

    async fn fetch_tasks(&self, phase: PhaseId) -> Result<Vec<Task>, BackendError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tasks
            .get(&phase)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit_entry(&self, command: &CreateEntryCommand) -> Result<EntryId, BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.submit_error.clone() {
            return Err(error);
        }
        state.submitted.push(command.clone());
        Ok(EntryId::new(state.submitted.len() as i64))
    }
}
