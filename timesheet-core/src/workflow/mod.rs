//! The entry form as a state machine.
//!
//! [`EntryWorkflow`] never performs I/O. Selections that need a dependent list
//! return a [`FetchRequest`]; the caller runs it and hands the outcome back
//! through [`EntryWorkflow::apply`], which drops it unless the lookup is still
//! waiting for that exact parent key and ticket.

mod lookup;
mod session;
mod stage;

use time::{Date, Time};
use tracing::{debug, info, warn};

pub use lookup::{FetchTicket, Lookup};
pub use session::{EntrySession, SessionEvent};
pub use stage::{Category, DraftEntry, PhaseBranch, ProjectBranch, ProjectPath, Stage};

use crate::clock::{
    hours_from_minutes, minute_of_day, options_from, time_at_minute, time_options, DateKey,
    Granularity, TimeOption,
};
use crate::error::{LoadError, LookupKind, SubmitError, ValidationError, WorkflowError};
use crate::grid::SlotSelection;
use crate::models::{CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TaskId};
use crate::settings::WorkflowSettings;

/// A dependent list the caller should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    Projects { ticket: FetchTicket },
    Phases { project: ProjectId, ticket: FetchTicket },
    Tasks { phase: PhaseId, ticket: FetchTicket },
}

impl FetchRequest {
    pub fn kind(&self) -> LookupKind {
        match self {
            FetchRequest::Projects { .. } => LookupKind::Projects,
            FetchRequest::Phases { .. } => LookupKind::Phases,
            FetchRequest::Tasks { .. } => LookupKind::Tasks,
        }
    }

    pub fn ticket(&self) -> FetchTicket {
        match self {
            FetchRequest::Projects { ticket }
            | FetchRequest::Phases { ticket, .. }
            | FetchRequest::Tasks { ticket, .. } => *ticket,
        }
    }
}

/// Outcome of a [`FetchRequest`], tagged with the key and ticket it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    Projects {
        ticket: FetchTicket,
        result: Result<Vec<Project>, LoadError>,
    },
    Phases {
        project: ProjectId,
        ticket: FetchTicket,
        result: Result<Vec<Phase>, LoadError>,
    },
    Tasks {
        phase: PhaseId,
        ticket: FetchTicket,
        result: Result<Vec<Task>, LoadError>,
    },
}

impl FetchResponse {
    pub fn kind(&self) -> LookupKind {
        match self {
            FetchResponse::Projects { .. } => LookupKind::Projects,
            FetchResponse::Phases { .. } => LookupKind::Phases,
            FetchResponse::Tasks { .. } => LookupKind::Tasks,
        }
    }

    fn error(&self) -> Option<&LoadError> {
        match self {
            FetchResponse::Projects { result, .. } => result.as_ref().err(),
            FetchResponse::Phases { result, .. } => result.as_ref().err(),
            FetchResponse::Tasks { result, .. } => result.as_ref().err(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The lookup has moved on to another parent or a newer fetch.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct EntryWorkflow {
    settings: WorkflowSettings,
    work_date: DateKey,
    start_time: Option<Time>,
    end_time: Option<Time>,
    notes: String,
    stage: Stage,
    next_ticket: FetchTicket,
    submitting: Option<CreateEntryCommand>,
    status: Option<String>,
}

fn issue(next: &mut FetchTicket) -> FetchTicket {
    let ticket = *next;
    *next = ticket.next();
    ticket
}

/// First option at or after `minute`, if one is left that day.
fn first_option_at(minute: u16, step: Granularity) -> Option<Time> {
    time_at_minute(step.ceil(minute))
}

impl EntryWorkflow {
    /// An empty draft on `work_date` with the default working hours.
    pub fn new(settings: WorkflowSettings, work_date: DateKey) -> Self {
        Self {
            settings,
            work_date,
            start_time: Some(settings.default_start),
            end_time: Some(settings.default_end),
            notes: String::new(),
            stage: Stage::Idle,
            next_ticket: FetchTicket::first(),
            submitting: None,
            status: None,
        }
    }

    /// A draft starting at a grid selection and spanning at least one slot.
    pub fn seeded(settings: WorkflowSettings, selection: SlotSelection, span: Granularity) -> Self {
        let mut workflow = Self::new(settings, selection.date);
        let start = u16::from(selection.hour) * 60 + u16::from(selection.minute);
        let gap = span.as_minutes().max(settings.minimum_duration.as_minutes());
        workflow.start_time = time_at_minute(start);
        workflow.end_time = workflow
            .start_time
            .and_then(|_| first_option_at(start + gap, settings.option_step));
        workflow
    }

    fn ensure_editable(&self) -> Result<(), WorkflowError> {
        if matches!(self.stage, Stage::Submitted { .. }) {
            return Err(WorkflowError::AlreadySubmitted);
        }
        if self.submitting.is_some() {
            return Err(WorkflowError::SubmitInFlight);
        }
        Ok(())
    }

    /// Choose the top-level category. Choosing `Project` fetches the project
    /// list unless it is already loaded or loading.
    pub fn select_category(&mut self, category: Category) -> Result<Option<FetchRequest>, WorkflowError> {
        self.ensure_editable()?;
        self.status = None;

        match category {
            Category::None => {
                self.stage = Stage::Idle;
                Ok(None)
            }
            Category::Internal => {
                self.stage = Stage::Internal;
                Ok(None)
            }
            Category::Project => {
                if let Stage::Project(path) = &self.stage {
                    if path.projects.error().is_none() {
                        return Ok(None);
                    }
                }
                let ticket = issue(&mut self.next_ticket);
                self.stage = Stage::Project(ProjectPath::new(Lookup::loading((), ticket)));
                debug!(%ticket, "fetching projects");
                Ok(Some(FetchRequest::Projects { ticket }))
            }
        }
    }

    /// Choose a project. Clears any chosen phase and task and fetches the
    /// project's phases, unless the same project is re-selected while its
    /// phases are loaded or loading.
    pub fn select_project(&mut self, project: ProjectId) -> Result<Option<FetchRequest>, WorkflowError> {
        self.ensure_editable()?;
        let Stage::Project(path) = &mut self.stage else {
            return Err(WorkflowError::NotInProjectCategory);
        };
        if !path.projects.is_ready() {
            return Err(WorkflowError::NotLoaded(LookupKind::Projects));
        }
        if !path.projects.items().iter().any(|p| p.id == project) {
            return Err(WorkflowError::UnknownProject(project));
        }
        self.status = None;

        if let Some(current) = &path.chosen {
            if current.project == project && current.phases.error().is_none() {
                return Ok(None);
            }
        }

        let ticket = issue(&mut self.next_ticket);
        path.chosen = Some(ProjectBranch {
            project,
            phases: Lookup::loading(project, ticket),
            chosen: None,
        });
        debug!(%project, %ticket, "fetching phases");
        Ok(Some(FetchRequest::Phases { project, ticket }))
    }

    /// Choose a phase of the chosen project. Clears any chosen task and
    /// fetches the phase's tasks.
    pub fn select_phase(&mut self, phase: PhaseId) -> Result<Option<FetchRequest>, WorkflowError> {
        self.ensure_editable()?;
        let Stage::Project(path) = &mut self.stage else {
            return Err(WorkflowError::NotInProjectCategory);
        };
        let branch = path.chosen.as_mut().ok_or(WorkflowError::NoProjectChosen)?;
        if !branch.phases.is_ready() {
            return Err(WorkflowError::NotLoaded(LookupKind::Phases));
        }
        if !branch.phases.items().iter().any(|p| p.id == phase) {
            return Err(WorkflowError::UnknownPhase(phase));
        }
        self.status = None;

        if let Some(current) = &branch.chosen {
            if current.phase == phase && current.tasks.error().is_none() {
                return Ok(None);
            }
        }

        let ticket = issue(&mut self.next_ticket);
        branch.chosen = Some(PhaseBranch {
            phase,
            tasks: Lookup::loading(phase, ticket),
            chosen: None,
        });
        debug!(%phase, %ticket, "fetching tasks");
        Ok(Some(FetchRequest::Tasks { phase, ticket }))
    }

    pub fn select_task(&mut self, task: TaskId) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        let Stage::Project(path) = &mut self.stage else {
            return Err(WorkflowError::NotInProjectCategory);
        };
        let branch = path
            .chosen
            .as_mut()
            .ok_or(WorkflowError::NoProjectChosen)?
            .chosen
            .as_mut()
            .ok_or(WorkflowError::NoPhaseChosen)?;
        if !branch.tasks.is_ready() {
            return Err(WorkflowError::NotLoaded(LookupKind::Tasks));
        }
        if !branch.tasks.items().iter().any(|t| t.id == task) {
            return Err(WorkflowError::UnknownTask(task));
        }
        branch.chosen = Some(task);
        self.status = None;
        Ok(())
    }

    /// Apply a fetch outcome if the lookup is still waiting for it.
    pub fn apply(&mut self, response: FetchResponse) -> ApplyOutcome {
        let kind = response.kind();
        let failure = response.error().cloned();

        let applied = match response {
            FetchResponse::Projects { ticket, result } => match self.stage.project_path_mut() {
                Some(path) if path.projects.awaits((), ticket) => {
                    path.projects.resolve(result);
                    true
                }
                _ => false,
            },
            FetchResponse::Phases {
                project,
                ticket,
                result,
            } => match self.stage.project_path_mut().and_then(|p| p.chosen.as_mut()) {
                Some(branch) if branch.phases.awaits(project, ticket) => {
                    branch
                        .phases
                        .resolve(result.map(|phases| phases.into_iter().filter(|p| p.enabled).collect()));
                    true
                }
                _ => false,
            },
            FetchResponse::Tasks {
                phase,
                ticket,
                result,
            } => match self
                .stage
                .project_path_mut()
                .and_then(|p| p.chosen.as_mut())
                .and_then(|b| b.chosen.as_mut())
            {
                Some(branch) if branch.tasks.awaits(phase, ticket) => {
                    branch
                        .tasks
                        .resolve(result.map(|tasks| tasks.into_iter().filter(|t| t.enabled).collect()));
                    true
                }
                _ => false,
            },
        };

        if !applied {
            debug!("discarding superseded {kind} response");
            return ApplyOutcome::Discarded;
        }
        if let Some(error) = failure {
            warn!(%error, "lookup failed");
            self.status = Some(error.to_string());
        }
        ApplyOutcome::Applied
    }

    /// Return to category selection. Date, times and notes are kept.
    pub fn back(&mut self) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        self.stage = Stage::Idle;
        self.status = None;
        Ok(())
    }

    /// Change the work date. Dates after `today` are rejected.
    pub fn set_work_date(&mut self, date: DateKey, today: Date) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        if date.date() > today {
            return Err(WorkflowError::FutureWorkDate(date));
        }
        self.work_date = date;
        self.status = None;
        Ok(())
    }

    /// Change the start time, moving the end forward if it would no longer
    /// leave the minimum duration.
    pub fn set_start_time(&mut self, start: Time) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        let earliest_end = minute_of_day(start) + self.settings.minimum_duration.as_minutes();
        let keep_end = self
            .end_time
            .is_some_and(|end| minute_of_day(end) >= earliest_end);
        if !keep_end {
            self.end_time = first_option_at(earliest_end, self.settings.option_step);
        }
        self.start_time = Some(start);
        self.status = None;
        Ok(())
    }

    pub fn set_end_time(&mut self, end: Time) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        self.end_time = Some(end);
        self.status = None;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WorkflowError> {
        self.ensure_editable()?;
        self.notes = notes.into();
        self.status = None;
        Ok(())
    }

    /// Every start option of the day.
    pub fn time_options(&self) -> Vec<TimeOption> {
        time_options(self.settings.option_step)
    }

    /// End options that leave at least the minimum duration after the start.
    pub fn end_options(&self) -> Vec<TimeOption> {
        match self.start_time {
            Some(start) => options_from(
                minute_of_day(start) + self.settings.minimum_duration.as_minutes(),
                self.settings.option_step,
            ),
            None => self.time_options(),
        }
    }

    /// Whether every selection the category requires has been made.
    pub fn time_inputs_visible(&self) -> bool {
        match &self.stage {
            Stage::Idle | Stage::Submitted { .. } => false,
            Stage::Internal | Stage::Project(_) => self.check_selections().is_ok(),
        }
    }

    fn check_selections(&self) -> Result<(), ValidationError> {
        let path = match &self.stage {
            Stage::Idle => return Err(ValidationError::CategoryRequired),
            Stage::Internal | Stage::Submitted { .. } => return Ok(()),
            Stage::Project(path) => path,
        };

        let branch = path.chosen.as_ref().ok_or(ValidationError::ProjectRequired)?;
        match &branch.phases {
            Lookup::Ready { items, .. } if items.is_empty() => return Ok(()),
            Lookup::Ready { .. } => {}
            _ => return Err(ValidationError::LookupIncomplete(LookupKind::Phases)),
        }

        let phase = branch.chosen.as_ref().ok_or(ValidationError::PhaseRequired)?;
        match &phase.tasks {
            Lookup::Ready { items, .. } if items.is_empty() => Ok(()),
            Lookup::Ready { .. } if phase.chosen.is_some() => Ok(()),
            Lookup::Ready { .. } => Err(ValidationError::TaskRequired),
            _ => Err(ValidationError::LookupIncomplete(LookupKind::Tasks)),
        }
    }

    /// Check the draft and build the create command. Reports the first
    /// failing rule and leaves the draft untouched.
    pub fn validate(&self) -> Result<CreateEntryCommand, ValidationError> {
        if let Stage::Submitted { command, .. } = &self.stage {
            return Ok(command.clone());
        }
        self.check_selections()?;

        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return Err(ValidationError::TimeRangeRequired);
        };
        let minimum = self.settings.minimum_duration.as_minutes();
        let (start_minute, end_minute) = (minute_of_day(start), minute_of_day(end));
        if end_minute < start_minute + minimum {
            return Err(ValidationError::DurationTooShort(minimum));
        }

        Ok(CreateEntryCommand {
            project_id: self.selected_project().unwrap_or(ProjectId::INTERNAL),
            phase_id: self.selected_phase(),
            task_id: self.selected_task(),
            date: self.work_date,
            start_time: start,
            end_time: end,
            hours: hours_from_minutes(u32::from(end_minute - start_minute)),
            notes: self.notes.clone(),
        })
    }

    /// Validate and mark a submit as in flight. The returned command goes to
    /// the backend; its outcome comes back through [`Self::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<CreateEntryCommand, WorkflowError> {
        self.ensure_editable()?;
        match self.validate() {
            Ok(command) => {
                info!(date = %command.date, hours = command.hours, "submitting entry");
                self.submitting = Some(command.clone());
                self.status = None;
                Ok(command)
            }
            Err(error) => {
                debug!(%error, "draft failed validation");
                self.status = Some(error.to_string());
                Err(error.into())
            }
        }
    }

    pub fn finish_submit(&mut self, result: Result<EntryId, SubmitError>) {
        let Some(command) = self.submitting.take() else {
            warn!("submit completed without a submit in flight");
            return;
        };
        match result {
            Ok(entry) => {
                info!(%entry, "entry saved");
                self.stage = Stage::Submitted { entry, command };
                self.status = None;
            }
            Err(error) => {
                warn!(%error, "entry save failed");
                self.status = Some(error.to_string());
            }
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn category(&self) -> Category {
        self.stage.category()
    }

    pub fn work_date(&self) -> DateKey {
        self.work_date
    }

    pub fn start_time(&self) -> Option<Time> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Time> {
        self.end_time
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Last validation, load or save problem, cleared by the next edit.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    pub fn submitted_entry(&self) -> Option<EntryId> {
        match &self.stage {
            Stage::Submitted { entry, .. } => Some(*entry),
            _ => None,
        }
    }

    pub fn projects(&self) -> Option<&Lookup<(), Project>> {
        self.stage.project_path().map(ProjectPath::projects)
    }

    pub fn phases(&self) -> Option<&Lookup<ProjectId, Phase>> {
        self.stage
            .project_path()
            .and_then(ProjectPath::chosen)
            .map(ProjectBranch::phases)
    }

    pub fn tasks(&self) -> Option<&Lookup<PhaseId, Task>> {
        self.stage
            .project_path()
            .and_then(ProjectPath::phase_branch)
            .map(PhaseBranch::tasks)
    }

    pub fn selected_project(&self) -> Option<ProjectId> {
        match &self.stage {
            Stage::Project(path) => path.chosen().map(ProjectBranch::project),
            Stage::Submitted { command, .. } if !command.is_internal() => Some(command.project_id),
            _ => None,
        }
    }

    pub fn selected_phase(&self) -> Option<PhaseId> {
        match &self.stage {
            Stage::Project(path) => path.phase_branch().map(PhaseBranch::phase),
            Stage::Submitted { command, .. } => command.phase_id,
            _ => None,
        }
    }

    pub fn selected_task(&self) -> Option<TaskId> {
        match &self.stage {
            Stage::Project(path) => path.phase_branch().and_then(PhaseBranch::chosen),
            Stage::Submitted { command, .. } => command.task_id,
            _ => None,
        }
    }

    /// Duration of the current range in hours, if it is non-empty.
    pub fn duration_hours(&self) -> Option<f64> {
        let (start, end) = (minute_of_day(self.start_time?), minute_of_day(self.end_time?));
        (end > start).then(|| hours_from_minutes(u32::from(end - start)))
    }

    pub fn draft(&self) -> DraftEntry {
        DraftEntry {
            work_date: self.work_date,
            category: self.category(),
            project_id: self.selected_project(),
            phase_id: self.selected_phase(),
            task_id: self.selected_task(),
            start_time: self.start_time,
            end_time: self.end_time,
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use time::macros::{date, time};

    fn day() -> DateKey {
        DateKey::new(date!(2024 - 06 - 12))
    }

    fn workflow() -> EntryWorkflow {
        EntryWorkflow::new(WorkflowSettings::default(), day())
    }

    fn projects() -> Vec<Project> {
        vec![Project::new(1, "Alpha Project"), Project::new(2, "Beta Project")]
    }

    fn respond_projects(request: Option<FetchRequest>, items: Vec<Project>) -> FetchResponse {
        match request {
            Some(FetchRequest::Projects { ticket }) => FetchResponse::Projects {
                ticket,
                result: Ok(items),
            },
            other => panic!("expected a projects request, got {other:?}"),
        }
    }

    fn respond_phases(request: Option<FetchRequest>, result: Result<Vec<Phase>, LoadError>) -> FetchResponse {
        match request {
            Some(FetchRequest::Phases { project, ticket }) => FetchResponse::Phases {
                project,
                ticket,
                result,
            },
            other => panic!("expected a phases request, got {other:?}"),
        }
    }

    fn respond_tasks(request: Option<FetchRequest>, items: Vec<Task>) -> FetchResponse {
        match request {
            Some(FetchRequest::Tasks { phase, ticket }) => FetchResponse::Tasks {
                phase,
                ticket,
                result: Ok(items),
            },
            other => panic!("expected a tasks request, got {other:?}"),
        }
    }

    /// A workflow in the Project category with the project list loaded.
    fn with_projects() -> EntryWorkflow {
        let mut wf = workflow();
        let request = wf.select_category(Category::Project).unwrap();
        assert_eq!(wf.apply(respond_projects(request, projects())), ApplyOutcome::Applied);
        wf
    }

    #[test]
    fn new_draft_uses_defaults() {
        let wf = workflow();
        assert_eq!(wf.category(), Category::None);
        assert_eq!(wf.work_date(), day());
        assert_eq!(wf.start_time(), Some(time!(9:00)));
        assert_eq!(wf.end_time(), Some(time!(17:00)));
        assert_eq!(wf.notes(), "");
        assert!(!wf.time_inputs_visible());
    }

    #[test]
    fn seeded_from_slot_selection() {
        let selection = SlotSelection {
            date: day(),
            hour: 10,
            minute: 30,
        };
        let wf = EntryWorkflow::seeded(WorkflowSettings::default(), selection, Granularity::HALF_HOUR);
        assert_eq!(wf.work_date(), day());
        assert_eq!(wf.start_time(), Some(time!(10:30)));
        assert_eq!(wf.end_time(), Some(time!(11:00)));
    }

    #[test]
    fn seeded_at_end_of_day_leaves_end_empty() {
        let selection = SlotSelection {
            date: day(),
            hour: 23,
            minute: 45,
        };
        let wf = EntryWorkflow::seeded(WorkflowSettings::default(), selection, Granularity::HALF_HOUR);
        assert_eq!(wf.start_time(), Some(time!(23:45)));
        assert_eq!(wf.end_time(), None);
        assert_eq!(
            wf.validate().unwrap_err(),
            ValidationError::CategoryRequired
        );
    }

    #[test]
    fn internal_submits_without_project() {
        let mut wf = workflow();
        assert_eq!(wf.select_category(Category::Internal).unwrap(), None);
        assert!(wf.time_inputs_visible());

        let command = wf.begin_submit().unwrap();
        assert!(command.is_internal());
        assert_eq!(command.project_id, ProjectId::INTERNAL);
        assert_eq!(command.phase_id, None);
        assert_eq!(command.task_id, None);
        assert_eq!(command.hours, 8.0);
        assert_eq!(command.date, day());
    }

    #[test]
    fn submit_without_category_is_rejected() {
        let mut wf = workflow();
        let before = wf.draft();
        let err = wf.begin_submit().unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::CategoryRequired));
        assert_eq!(wf.status(), Some("Please choose Project or Internal Meeting."));
        assert_eq!(wf.draft(), before);
        assert!(!wf.is_submitting());
    }

    #[test]
    fn project_with_phases_requires_a_phase() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(
            request,
            Ok(vec![Phase::new(10, "Design"), Phase::new(11, "Build")]),
        ));

        assert!(!wf.time_inputs_visible());
        assert_eq!(wf.validate().unwrap_err(), ValidationError::PhaseRequired);
        assert_eq!(
            wf.validate().unwrap_err().to_string(),
            "Please select a phase."
        );
    }

    #[test]
    fn full_project_path_builds_command() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(
            request,
            Ok(vec![Phase::new(10, "Design"), Phase::new(11, "Old").disabled()]),
        ));
        assert_eq!(wf.phases().unwrap().items().len(), 1);
        assert_eq!(
            wf.select_phase(PhaseId::new(11)).unwrap_err(),
            WorkflowError::UnknownPhase(PhaseId::new(11))
        );

        let request = wf.select_phase(PhaseId::new(10)).unwrap();
        wf.apply(respond_tasks(
            request,
            vec![Task::new(100, "Wireframes"), Task::new(101, "Review")],
        ));
        assert_eq!(wf.validate().unwrap_err(), ValidationError::TaskRequired);

        wf.select_task(TaskId::new(101)).unwrap();
        assert!(wf.time_inputs_visible());
        wf.set_notes("Sprint review").unwrap();

        let command = wf.validate().unwrap();
        assert_eq!(command.project_id, ProjectId::new(1));
        assert_eq!(command.phase_id, Some(PhaseId::new(10)));
        assert_eq!(command.task_id, Some(TaskId::new(101)));
        assert_eq!(command.notes, "Sprint review");
    }

    #[test]
    fn project_without_phases_needs_nothing_more() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(2)).unwrap();
        wf.apply(respond_phases(request, Ok(vec![Phase::new(20, "Gone").disabled()])));

        assert!(wf.time_inputs_visible());
        let command = wf.validate().unwrap();
        assert_eq!(command.project_id, ProjectId::new(2));
        assert_eq!(command.phase_id, None);
    }

    #[test]
    fn phase_without_tasks_needs_no_task() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(request, Ok(vec![Phase::new(10, "Design")])));
        let request = wf.select_phase(PhaseId::new(10)).unwrap();
        assert_eq!(
            wf.validate().unwrap_err(),
            ValidationError::LookupIncomplete(LookupKind::Tasks)
        );
        wf.apply(respond_tasks(request, vec![]));
        assert_eq!(wf.validate().unwrap().task_id, None);
    }

    #[test]
    fn changing_project_clears_children_immediately() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(request, Ok(vec![Phase::new(10, "Design")])));
        let request = wf.select_phase(PhaseId::new(10)).unwrap();
        wf.apply(respond_tasks(request, vec![Task::new(100, "Wireframes")]));
        wf.select_task(TaskId::new(100)).unwrap();

        let request = wf.select_project(ProjectId::new(2)).unwrap();
        assert!(matches!(
            request,
            Some(FetchRequest::Phases { project, .. }) if project == ProjectId::new(2)
        ));
        assert_eq!(wf.selected_phase(), None);
        assert_eq!(wf.selected_task(), None);
        assert!(wf.tasks().is_none());
        let phases = wf.phases().unwrap();
        assert!(phases.is_loading());
        assert!(phases.items().is_empty());
        assert_eq!(phases.key(), ProjectId::new(2));
    }

    #[test]
    fn stale_phase_response_is_discarded_in_either_order() {
        // Late response for the old project arrives last.
        let mut wf = with_projects();
        let first = wf.select_project(ProjectId::new(1)).unwrap();
        let second = wf.select_project(ProjectId::new(2)).unwrap();
        assert_eq!(
            wf.apply(respond_phases(second, Ok(vec![Phase::new(20, "Beta phase")]))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            wf.apply(respond_phases(first, Ok(vec![Phase::new(10, "Alpha phase")]))),
            ApplyOutcome::Discarded
        );
        assert_eq!(wf.phases().unwrap().items()[0].name, "Beta phase");

        // Late response for the old project arrives first.
        let mut wf = with_projects();
        let first = wf.select_project(ProjectId::new(1)).unwrap();
        let second = wf.select_project(ProjectId::new(2)).unwrap();
        assert_eq!(
            wf.apply(respond_phases(first, Ok(vec![Phase::new(10, "Alpha phase")]))),
            ApplyOutcome::Discarded
        );
        assert!(wf.phases().unwrap().is_loading());
        wf.apply(respond_phases(second, Ok(vec![Phase::new(20, "Beta phase")])));
        assert_eq!(wf.phases().unwrap().items()[0].name, "Beta phase");
    }

    #[test]
    fn same_project_refetched_after_switching_back_uses_newest_ticket() {
        let mut wf = with_projects();
        let first = wf.select_project(ProjectId::new(1)).unwrap();
        wf.select_project(ProjectId::new(2)).unwrap();
        let third = wf.select_project(ProjectId::new(1)).unwrap();

        assert_eq!(
            wf.apply(respond_phases(first, Ok(vec![Phase::new(10, "Stale")]))),
            ApplyOutcome::Discarded
        );
        assert_eq!(
            wf.apply(respond_phases(third, Ok(vec![Phase::new(10, "Fresh")]))),
            ApplyOutcome::Applied
        );
        assert_eq!(wf.phases().unwrap().items()[0].name, "Fresh");
    }

    #[test]
    fn stale_task_response_is_discarded() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(
            request,
            Ok(vec![Phase::new(10, "Design"), Phase::new(11, "Build")]),
        ));
        let first = wf.select_phase(PhaseId::new(10)).unwrap();
        let second = wf.select_phase(PhaseId::new(11)).unwrap();

        assert_eq!(
            wf.apply(respond_tasks(first, vec![Task::new(100, "Wireframes")])),
            ApplyOutcome::Discarded
        );
        assert!(wf.tasks().unwrap().is_loading());
        wf.apply(respond_tasks(second, vec![Task::new(110, "Backend")]));
        assert_eq!(wf.tasks().unwrap().key(), PhaseId::new(11));
    }

    #[test]
    fn task_response_after_project_change_is_discarded() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(request, Ok(vec![Phase::new(10, "Design")])));
        let tasks = wf.select_phase(PhaseId::new(10)).unwrap();
        wf.select_project(ProjectId::new(2)).unwrap();

        assert_eq!(
            wf.apply(respond_tasks(tasks, vec![Task::new(100, "Wireframes")])),
            ApplyOutcome::Discarded
        );
        assert!(wf.tasks().is_none());
    }

    #[test]
    fn failed_phase_load_locks_downstream_until_retry() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        let error = LoadError::new(LookupKind::Phases, BackendError::request("connection reset"));
        wf.apply(respond_phases(request, Err(error)));

        assert!(wf.phases().unwrap().error().is_some());
        assert_eq!(
            wf.status(),
            Some("Failed to load phases: request failed: connection reset")
        );
        assert_eq!(
            wf.select_phase(PhaseId::new(10)).unwrap_err(),
            WorkflowError::NotLoaded(LookupKind::Phases)
        );
        assert_eq!(
            wf.validate().unwrap_err(),
            ValidationError::LookupIncomplete(LookupKind::Phases)
        );
        assert!(!wf.time_inputs_visible());

        let retry = wf.select_project(ProjectId::new(1)).unwrap();
        assert!(retry.is_some());
        assert_eq!(wf.status(), None);
        wf.apply(respond_phases(retry, Ok(vec![Phase::new(10, "Design")])));
        assert!(wf.select_phase(PhaseId::new(10)).unwrap().is_some());
    }

    #[test]
    fn failed_project_load_is_retried_by_reselecting_category() {
        let mut wf = workflow();
        let request = wf.select_category(Category::Project).unwrap();
        let Some(FetchRequest::Projects { ticket }) = request else {
            panic!("expected a projects request");
        };
        wf.apply(FetchResponse::Projects {
            ticket,
            result: Err(LoadError::new(LookupKind::Projects, BackendError::Unauthorized)),
        });
        assert_eq!(
            wf.select_project(ProjectId::new(1)).unwrap_err(),
            WorkflowError::NotLoaded(LookupKind::Projects)
        );

        let retry = wf.select_category(Category::Project).unwrap();
        assert!(retry.is_some());
        assert_ne!(retry.map(|r| r.ticket()), Some(ticket));
    }

    #[test]
    fn reselecting_loaded_parents_does_not_refetch() {
        let mut wf = with_projects();
        assert_eq!(wf.select_category(Category::Project).unwrap(), None);

        let request = wf.select_project(ProjectId::new(1)).unwrap();
        assert_eq!(wf.select_project(ProjectId::new(1)).unwrap(), None);
        wf.apply(respond_phases(request, Ok(vec![Phase::new(10, "Design")])));
        assert_eq!(wf.select_project(ProjectId::new(1)).unwrap(), None);
        assert!(wf.phases().unwrap().is_ready());
    }

    #[test]
    fn illegal_selections_are_rejected() {
        let mut wf = workflow();
        assert_eq!(
            wf.select_project(ProjectId::new(1)).unwrap_err(),
            WorkflowError::NotInProjectCategory
        );

        wf.select_category(Category::Project).unwrap();
        assert_eq!(
            wf.select_project(ProjectId::new(1)).unwrap_err(),
            WorkflowError::NotLoaded(LookupKind::Projects)
        );

        let mut wf = with_projects();
        assert_eq!(
            wf.select_project(ProjectId::new(9)).unwrap_err(),
            WorkflowError::UnknownProject(ProjectId::new(9))
        );
        assert_eq!(
            wf.select_phase(PhaseId::new(10)).unwrap_err(),
            WorkflowError::NoProjectChosen
        );
        assert_eq!(
            wf.select_task(TaskId::new(100)).unwrap_err(),
            WorkflowError::NoProjectChosen
        );
        assert_eq!(wf.validate().unwrap_err(), ValidationError::ProjectRequired);
    }

    #[test]
    fn start_change_advances_end_on_five_minute_options() {
        let settings = WorkflowSettings::default().with_option_step(Granularity::FIVE_MINUTES);
        let mut wf = EntryWorkflow::new(settings, day());
        wf.set_end_time(time!(9:15)).unwrap();

        wf.set_start_time(time!(9:50)).unwrap();
        assert_eq!(wf.start_time(), Some(time!(9:50)));
        assert_eq!(wf.end_time(), Some(time!(10:05)));
    }

    #[test]
    fn start_change_keeps_end_that_already_fits() {
        let mut wf = workflow();
        wf.set_start_time(time!(9:50)).unwrap();
        assert_eq!(wf.end_time(), Some(time!(17:00)));

        wf.set_end_time(time!(10:05)).unwrap();
        wf.set_start_time(time!(9:50)).unwrap();
        assert_eq!(wf.end_time(), Some(time!(10:05)));
    }

    #[test]
    fn start_change_rounds_end_to_option_step() {
        let mut wf = workflow();
        wf.set_end_time(time!(9:30)).unwrap();
        wf.set_start_time(time!(9:50)).unwrap();
        assert_eq!(wf.end_time(), Some(time!(10:15)));
    }

    #[test]
    fn start_change_near_midnight_clears_end() {
        let mut wf = workflow();
        wf.select_category(Category::Internal).unwrap();
        wf.set_start_time(time!(23:50)).unwrap();
        assert_eq!(wf.end_time(), None);
        assert_eq!(wf.validate().unwrap_err(), ValidationError::TimeRangeRequired);
    }

    #[test]
    fn end_options_leave_minimum_duration() {
        let mut wf = workflow();
        wf.set_start_time(time!(9:00)).unwrap();
        let options = wf.end_options();
        assert_eq!(options[0].value, time!(9:15));
        assert_eq!(options[0].label, "9:15 AM");
        assert_eq!(options.last().map(|o| o.value), Some(time!(23:45)));
        assert_eq!(wf.time_options().len(), 96);
    }

    #[test]
    fn short_or_inverted_range_fails_validation() {
        let mut wf = workflow();
        wf.select_category(Category::Internal).unwrap();

        wf.set_end_time(time!(9:10)).unwrap();
        let err = wf.validate().unwrap_err();
        assert_eq!(err, ValidationError::DurationTooShort(15));
        assert_eq!(
            err.to_string(),
            "End time must be at least 15 minutes after start time."
        );

        wf.set_end_time(time!(8:00)).unwrap();
        assert_eq!(wf.validate().unwrap_err(), ValidationError::DurationTooShort(15));
        assert_eq!(wf.duration_hours(), None);
    }

    #[test]
    fn hours_are_rounded_to_two_decimals() {
        let mut wf = workflow();
        wf.select_category(Category::Internal).unwrap();
        wf.set_end_time(time!(9:20)).unwrap();
        assert_eq!(wf.duration_hours(), Some(0.33));
        assert_eq!(wf.validate().unwrap().hours, 0.33);
    }

    #[test]
    fn back_clears_selections_but_keeps_draft_fields() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.apply(respond_phases(request, Ok(vec![])));
        wf.set_notes("standup").unwrap();
        wf.set_start_time(time!(8:00)).unwrap();

        wf.back().unwrap();
        assert_eq!(wf.category(), Category::None);
        assert_eq!(wf.selected_project(), None);
        assert!(wf.projects().is_none());
        assert_eq!(wf.notes(), "standup");
        assert_eq!(wf.start_time(), Some(time!(8:00)));
        assert_eq!(wf.work_date(), day());
    }

    #[test]
    fn phase_response_after_back_is_discarded() {
        let mut wf = with_projects();
        let request = wf.select_project(ProjectId::new(1)).unwrap();
        wf.back().unwrap();
        assert_eq!(
            wf.apply(respond_phases(request, Ok(vec![]))),
            ApplyOutcome::Discarded
        );
    }

    #[test]
    fn future_work_date_is_rejected() {
        let mut wf = workflow();
        let today = date!(2024 - 06 - 12);
        let tomorrow = DateKey::new(date!(2024 - 06 - 13));
        assert_eq!(
            wf.set_work_date(tomorrow, today).unwrap_err(),
            WorkflowError::FutureWorkDate(tomorrow)
        );
        let monday = DateKey::new(date!(2024 - 06 - 10));
        wf.set_work_date(monday, today).unwrap();
        assert_eq!(wf.work_date(), monday);
    }

    #[test]
    fn failed_submit_keeps_draft_for_retry() {
        let mut wf = workflow();
        wf.select_category(Category::Internal).unwrap();
        wf.set_notes("planning").unwrap();
        let command = wf.begin_submit().unwrap();

        assert!(wf.is_submitting());
        assert_eq!(wf.begin_submit().unwrap_err(), WorkflowError::SubmitInFlight);
        assert_eq!(wf.set_notes("edit").unwrap_err(), WorkflowError::SubmitInFlight);

        wf.finish_submit(Err(SubmitError(BackendError::request("503"))));
        assert!(!wf.is_submitting());
        assert_eq!(
            wf.status(),
            Some("Failed to save entry: request failed: 503")
        );
        assert_eq!(wf.notes(), "planning");
        assert_eq!(wf.validate().unwrap(), command);
    }

    #[test]
    fn successful_submit_is_terminal() {
        let mut wf = workflow();
        wf.select_category(Category::Internal).unwrap();
        let command = wf.begin_submit().unwrap();
        wf.finish_submit(Ok(EntryId::new(42)));

        assert_eq!(wf.submitted_entry(), Some(EntryId::new(42)));
        assert_eq!(wf.category(), Category::Internal);
        assert_eq!(wf.validate().unwrap(), command);
        assert_eq!(wf.begin_submit().unwrap_err(), WorkflowError::AlreadySubmitted);
        assert_eq!(
            wf.select_category(Category::Project).unwrap_err(),
            WorkflowError::AlreadySubmitted
        );
    }

    #[test]
    fn stray_submit_completion_is_ignored() {
        let mut wf = workflow();
        wf.finish_submit(Ok(EntryId::new(1)));
        assert_eq!(wf.submitted_entry(), None);
    }

    #[test]
    fn tickets_increase_across_lookups() {
        let mut wf = workflow();
        let first = wf.select_category(Category::Project).unwrap().unwrap();
        wf.apply(respond_projects(Some(first), projects()));
        let phases = wf.select_project(ProjectId::new(1)).unwrap().unwrap();
        assert!(phases.ticket() > first.ticket());
        assert_eq!(phases.kind(), LookupKind::Phases);
    }
}
