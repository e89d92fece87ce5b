use std::sync::Arc;

use time::{Date, Time};
use tokio::sync::mpsc;
use tracing::instrument;

use super::{ApplyOutcome, Category, EntryWorkflow, FetchRequest, FetchResponse};
use crate::clock::DateKey;
use crate::error::{LoadError, LookupKind, SubmitError, WorkflowError};
use crate::models::{EntryId, PhaseId, ProjectId, TaskId};
use crate::ports::TimesheetBackend;

enum Completion {
    Fetch(FetchResponse),
    Submit(Result<EntryId, SubmitError>),
}

/// What happened when a completion was handed back to the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LookupApplied(LookupKind),
    LookupDiscarded(LookupKind),
    Saved(EntryId),
    SaveFailed(SubmitError),
}

/// Drives an [`EntryWorkflow`] against a backend.
///
/// Fetches and submits run as tokio tasks; their results queue up on a
/// channel until the owner drains it with [`EntrySession::pump`] or
/// [`EntrySession::next_event`]. The workflow itself is only ever touched
/// by the owner.
pub struct EntrySession<B> {
    backend: Arc<B>,
    workflow: EntryWorkflow,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<B: TimesheetBackend> EntrySession<B> {
    pub fn new(backend: Arc<B>, workflow: EntryWorkflow) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            workflow,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn workflow(&self) -> &EntryWorkflow {
        &self.workflow
    }

    pub fn into_workflow(self) -> EntryWorkflow {
        self.workflow
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    pub fn select_category(&mut self, category: Category) -> Result<(), WorkflowError> {
        let request = self.workflow.select_category(category)?;
        self.dispatch(request);
        Ok(())
    }

    pub fn select_project(&mut self, project: ProjectId) -> Result<(), WorkflowError> {
        let request = self.workflow.select_project(project)?;
        self.dispatch(request);
        Ok(())
    }

    pub fn select_phase(&mut self, phase: PhaseId) -> Result<(), WorkflowError> {
        let request = self.workflow.select_phase(phase)?;
        self.dispatch(request);
        Ok(())
    }

    pub fn select_task(&mut self, task: TaskId) -> Result<(), WorkflowError> {
        self.workflow.select_task(task)
    }

    pub fn back(&mut self) -> Result<(), WorkflowError> {
        self.workflow.back()
    }

    pub fn set_work_date(&mut self, date: DateKey, today: Date) -> Result<(), WorkflowError> {
        self.workflow.set_work_date(date, today)
    }

    pub fn set_start_time(&mut self, start: Time) -> Result<(), WorkflowError> {
        self.workflow.set_start_time(start)
    }

    pub fn set_end_time(&mut self, end: Time) -> Result<(), WorkflowError> {
        self.workflow.set_end_time(end)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WorkflowError> {
        self.workflow.set_notes(notes)
    }

    /// Validate the draft and send it to the backend.
    pub fn submit(&mut self) -> Result<(), WorkflowError> {
        let command = self.workflow.begin_submit()?;
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = backend.submit_entry(&command).await.map_err(SubmitError::from);
            let _ = tx.send(Completion::Submit(result));
        });
        Ok(())
    }

    fn dispatch(&mut self, request: Option<FetchRequest>) {
        let Some(request) = request else {
            return;
        };
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let response = run_fetch(backend.as_ref(), request).await;
            let _ = tx.send(Completion::Fetch(response));
        });
    }

    /// Apply every completion that has already arrived. Never blocks.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            events.push(self.handle(completion));
        }
        events
    }

    /// Wait for the next completion. `None` when nothing is outstanding.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.handle(completion))
    }

    fn handle(&mut self, completion: Completion) -> SessionEvent {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Fetch(response) => {
                let kind = response.kind();
                match self.workflow.apply(response) {
                    ApplyOutcome::Applied => SessionEvent::LookupApplied(kind),
                    ApplyOutcome::Discarded => SessionEvent::LookupDiscarded(kind),
                }
            }
            Completion::Submit(result) => {
                let event = match &result {
                    Ok(entry) => SessionEvent::Saved(*entry),
                    Err(error) => SessionEvent::SaveFailed(error.clone()),
                };
                self.workflow.finish_submit(result);
                event
            }
        }
    }
}

#[instrument(skip(backend))]
async fn run_fetch<B: TimesheetBackend>(backend: &B, request: FetchRequest) -> FetchResponse {
    match request {
        FetchRequest::Projects { ticket } => FetchResponse::Projects {
            ticket,
            result: backend
                .fetch_active_projects()
                .await
                .map_err(|e| LoadError::new(LookupKind::Projects, e)),
        },
        FetchRequest::Phases { project, ticket } => FetchResponse::Phases {
            project,
            ticket,
            result: backend
                .fetch_phases(project)
                .await
                .map_err(|e| LoadError::new(LookupKind::Phases, e)),
        },
        FetchRequest::Tasks { phase, ticket } => FetchResponse::Tasks {
            phase,
            ticket,
            result: backend
                .fetch_tasks(phase)
                .await
                .map_err(|e| LoadError::new(LookupKind::Tasks, e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::models::{Phase, Project, Task};
    use crate::ports::MockBackend;
    use crate::settings::WorkflowSettings;
    use time::macros::{date, time};

    fn backend() -> MockBackend {
        MockBackend::new()
            .with_projects(vec![Project::new(1, "Alpha Project"), Project::new(2, "Beta Project")])
            .with_phases(1, vec![Phase::new(10, "Design")])
            .with_phases(2, vec![Phase::new(20, "Rollout")])
            .with_tasks(10, vec![Task::new(100, "Wireframes")])
    }

    fn session(backend: &MockBackend) -> EntrySession<MockBackend> {
        let workflow = EntryWorkflow::new(
            WorkflowSettings::default(),
            DateKey::new(date!(2024 - 06 - 12)),
        );
        EntrySession::new(Arc::new(backend.clone()), workflow)
    }

    async fn load_projects(session: &mut EntrySession<MockBackend>) {
        session.select_category(Category::Project).unwrap();
        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::LookupApplied(LookupKind::Projects))
        );
    }

    #[tokio::test]
    async fn slow_phases_for_previous_project_are_discarded() {
        let backend = backend();
        let gate = backend.gate_phases(1);
        let mut session = session(&backend);
        load_projects(&mut session).await;

        session.select_project(ProjectId::new(1)).unwrap();
        session.select_project(ProjectId::new(2)).unwrap();

        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::LookupApplied(LookupKind::Phases))
        );
        gate.notify_one();
        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::LookupDiscarded(LookupKind::Phases))
        );

        let phases = session.workflow().phases().unwrap();
        assert_eq!(phases.key(), ProjectId::new(2));
        assert_eq!(phases.items()[0].name, "Rollout");
        assert!(!session.has_pending());
    }

    #[tokio::test]
    async fn failed_phases_recover_on_reselect() {
        let backend = backend();
        backend.fail_phases(1, BackendError::request("connection refused"));
        let mut session = session(&backend);
        load_projects(&mut session).await;

        session.select_project(ProjectId::new(1)).unwrap();
        session.next_event().await;
        assert!(session.workflow().phases().unwrap().error().is_some());
        assert!(session.workflow().status().is_some());

        backend.heal_phases(1);
        session.select_project(ProjectId::new(1)).unwrap();
        session.next_event().await;
        assert!(session.workflow().phases().unwrap().is_ready());
        assert_eq!(backend.phase_calls(), vec![ProjectId::new(1), ProjectId::new(1)]);
    }

    #[tokio::test]
    async fn full_project_entry_is_submitted() {
        let backend = backend();
        let mut session = session(&backend);
        load_projects(&mut session).await;

        session.select_project(ProjectId::new(1)).unwrap();
        session.next_event().await;
        session.select_phase(PhaseId::new(10)).unwrap();
        session.next_event().await;
        session.select_task(TaskId::new(100)).unwrap();
        session.set_start_time(time!(13:00)).unwrap();
        session.set_end_time(time!(14:30)).unwrap();
        session.submit().unwrap();

        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::Saved(EntryId::new(1)))
        );
        let submitted = backend.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].task_id, Some(TaskId::new(100)));
        assert_eq!(submitted[0].hours, 1.5);
        assert_eq!(session.workflow().submitted_entry(), Some(EntryId::new(1)));
    }

    #[tokio::test]
    async fn failed_submit_can_be_retried() {
        let backend = backend();
        backend.fail_submit(Some(BackendError::Unauthorized));
        let mut session = session(&backend);
        session.select_category(Category::Internal).unwrap();
        session.set_notes("retro").unwrap();

        session.submit().unwrap();
        assert_eq!(session.submit().unwrap_err(), WorkflowError::SubmitInFlight);
        assert_eq!(
            session.next_event().await,
            Some(SessionEvent::SaveFailed(SubmitError(BackendError::Unauthorized)))
        );
        assert_eq!(session.workflow().notes(), "retro");

        backend.fail_submit(None);
        session.submit().unwrap();
        assert!(matches!(
            session.next_event().await,
            Some(SessionEvent::Saved(_))
        ));
        assert!(backend.submitted()[0].is_internal());
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let backend = backend();
        let mut session = session(&backend);
        let err = session.submit().unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(!session.has_pending());
        assert_eq!(session.next_event().await, None);
        assert!(backend.submitted().is_empty());
    }

    #[tokio::test]
    async fn pump_drains_without_blocking() {
        let backend = backend();
        let mut session = session(&backend);
        assert!(session.pump().is_empty());

        session.select_category(Category::Project).unwrap();
        let mut events = Vec::new();
        while session.has_pending() {
            tokio::task::yield_now().await;
            events.extend(session.pump());
        }
        assert_eq!(events, vec![SessionEvent::LookupApplied(LookupKind::Projects)]);
        assert_eq!(session.workflow().projects().unwrap().items().len(), 2);
    }
}
